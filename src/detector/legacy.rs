//! Legacy strategy: per-band connected components with spatial
//! post-filters.
use super::params::LegacyParams;
use super::region::{merge_while, MaskRegion};
use crate::image::Mask;
use crate::segmentation::{band_components_in, label_components, Component, Connectivity, Labeling};
use crate::types::Rect;
use log::debug;

/// Top and bottom bands of a `width × height` image. The bands overlap.
pub fn bands(width: u32, height: u32, params: &LegacyParams) -> (Rect, Rect) {
    let top_h = ((height as f32 * params.top_band_fraction).ceil() as u32).clamp(1, height);
    let bottom_y = ((height as f32 * params.bottom_band_start).floor() as u32).min(height - 1);
    let top = Rect {
        x: 0,
        y: 0,
        width,
        height: top_h,
    };
    let bottom = Rect {
        x: 0,
        y: bottom_y,
        width,
        height: height - bottom_y,
    };
    (top, bottom)
}

fn sized(components: Vec<Component>, min: usize, max: usize) -> impl Iterator<Item = MaskRegion> {
    components
        .into_iter()
        .filter(move |c| c.pixel_count >= min && c.pixel_count <= max)
        .map(|c| MaskRegion::from_component(&c))
}

/// Whole-image labels of the band components within the size limits.
fn band_labels(whole: &Labeling, mask: &Mask, band: &Rect, min: usize, max: usize) -> Vec<u32> {
    band_components_in(whole, mask, band, Connectivity::C8)
        .into_iter()
        .filter(|(c, _)| c.pixel_count >= min && c.pixel_count <= max)
        .map(|(_, label)| label)
        .collect()
}

/// Band heuristic, whole-image fallback, density filter, centroid merge and
/// overlap resolution.
///
/// Band components only select sprites. Each selected sprite is reported
/// with its whole-image component, so a shape crossing the band boundary
/// keeps its full extent and is counted once.
pub fn legacy_regions(mask: &Mask, params: &LegacyParams) -> Vec<MaskRegion> {
    if mask.w == 0 || mask.h == 0 {
        return Vec::new();
    }
    let image_area = (mask.w * mask.h) as f32;
    let top_max = (image_area * params.top_max_fraction) as usize;
    let bottom_max = (image_area * params.bottom_max_fraction) as usize;
    let (top, bottom) = bands(mask.w as u32, mask.h as u32, params);

    let whole = label_components(mask, Connectivity::C8);
    let mut labels = band_labels(&whole, mask, &top, params.top_min_pixels, top_max);
    for label in band_labels(&whole, mask, &bottom, params.bottom_min_pixels, bottom_max) {
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    let mut regions: Vec<MaskRegion> = labels
        .iter()
        .filter_map(|&l| whole.components.get((l as usize).checked_sub(1)?))
        .map(MaskRegion::from_component)
        .collect();

    if regions.len() < params.min_band_regions {
        debug!(
            "legacy: {} band regions, using whole-image components",
            regions.len()
        );
        regions = sized(whole.components, params.top_min_pixels, bottom_max).collect();
    }

    regions.retain(|r| r.density() >= params.min_density);
    let (regions, merges) = merge_while(regions, |a, b| {
        a.center_distance(b) < params.merge_distance
    });
    let regions = resolve_overlaps(regions);
    debug!(
        "legacy: {} regions after {} centroid merges",
        regions.len(),
        merges
    );
    regions
}

/// Of any two overlapping regions keep only the one with more pixels.
pub fn resolve_overlaps(mut regions: Vec<MaskRegion>) -> Vec<MaskRegion> {
    regions.sort_by(|a, b| b.pixel_count.cmp(&a.pixel_count));
    let mut kept: Vec<MaskRegion> = Vec::with_capacity(regions.len());
    for region in regions {
        if kept.iter().all(|k| !k.bounds.intersects(&region.bounds)) {
            kept.push(region);
        }
    }
    kept
}
