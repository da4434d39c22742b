//! Baseline strategy: connected components of the foreground mask.
use super::params::BaselineParams;
use super::region::{box_gap, merge_while, MaskRegion};
use crate::image::Mask;
use crate::segmentation::{connected_components, Connectivity};

/// 8-connected components filtered by size and density, with components
/// closer than `merge_gap` pixels merged.
pub fn baseline_regions(mask: &Mask, params: &BaselineParams) -> Vec<MaskRegion> {
    let image_area = (mask.w * mask.h) as f32;
    let min_pixels = params
        .min_pixels
        .max((image_area * params.min_area_fraction) as usize);
    let max_pixels = (image_area * params.max_area_fraction) as usize;

    let regions: Vec<MaskRegion> = connected_components(mask, Connectivity::C8)
        .iter()
        .map(MaskRegion::from_component)
        .collect();
    let (regions, _) = merge_while(regions, |a, b| {
        box_gap(&a.bounds, &b.bounds) <= params.merge_gap
    });
    regions
        .into_iter()
        .filter(|r| {
            r.pixel_count >= min_pixels
                && r.pixel_count <= max_pixels
                && r.density() >= params.min_density
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_squares(gap: usize) -> Mask {
        Mask::from_fn(80, 30, |x, y| {
            (5..25).contains(&y) && ((5..25).contains(&x) || (25 + gap..45 + gap).contains(&x))
        })
    }

    #[test]
    fn wide_gap_keeps_two_regions() {
        let regions = baseline_regions(&two_squares(10), &BaselineParams::default());
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].pixel_count, 400);
    }

    #[test]
    fn gap_below_merge_threshold_collapses_to_one() {
        let params = BaselineParams::default();
        let regions = baseline_regions(&two_squares(params.merge_gap as usize), &params);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].pixel_count, 800);
    }

    #[test]
    fn specks_and_sparse_blobs_are_dropped() {
        let mask = Mask::from_fn(60, 60, |x, y| {
            (x == 2 && y == 2) || ((20..40).contains(&x) && (20..40).contains(&y))
        });
        let regions = baseline_regions(&mask, &BaselineParams::default());
        assert_eq!(regions.len(), 1);

        let ring = Mask::from_fn(60, 60, |x, y| {
            let on_edge = x == 5 || x == 54 || y == 5 || y == 54;
            on_edge && (5..55).contains(&x) && (5..55).contains(&y)
        });
        let params = BaselineParams {
            min_density: 0.2,
            ..Default::default()
        };
        assert!(baseline_regions(&ring, &params).is_empty());
    }
}
