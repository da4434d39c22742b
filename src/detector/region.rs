//! Candidate regions handled by the detector strategies.
use crate::segmentation::Component;
use crate::types::Rect;
use serde::Serialize;

/// Foreground blob (or union of blobs) with its summary statistics.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskRegion {
    pub bounds: Rect,
    pub pixel_count: usize,
    pub centroid: [f32; 2],
    pub confidence: f32,
}

impl MaskRegion {
    /// Confidence of a mask component grows with how solidly it fills its
    /// box.
    pub fn from_component(c: &Component) -> Self {
        Self {
            bounds: c.bounds,
            pixel_count: c.pixel_count,
            centroid: c.centroid,
            confidence: (0.5 + 0.5 * c.density()).min(1.0),
        }
    }

    pub fn density(&self) -> f32 {
        self.pixel_count as f32 / self.bounds.area() as f32
    }

    /// Union of two regions; statistics are pixel-count weighted.
    pub fn merged(&self, other: &MaskRegion) -> MaskRegion {
        let total = self.pixel_count + other.pixel_count;
        let (wa, wb) = if total == 0 {
            (0.5, 0.5)
        } else {
            (
                self.pixel_count as f32 / total as f32,
                other.pixel_count as f32 / total as f32,
            )
        };
        MaskRegion {
            bounds: self.bounds.union(&other.bounds),
            pixel_count: total,
            centroid: [
                self.centroid[0] * wa + other.centroid[0] * wb,
                self.centroid[1] * wa + other.centroid[1] * wb,
            ],
            confidence: (self.confidence * wa + other.confidence * wb).clamp(0.0, 1.0),
        }
    }

    pub fn center_distance(&self, other: &MaskRegion) -> f32 {
        let dx = self.centroid[0] - other.centroid[0];
        let dy = self.centroid[1] - other.centroid[1];
        (dx * dx + dy * dy).sqrt()
    }
}

/// Chebyshev gap in pixels between two boxes, 0 when they touch or overlap.
pub fn box_gap(a: &Rect, b: &Rect) -> u32 {
    let gap_x = b.x.saturating_sub(a.right()).max(a.x.saturating_sub(b.right()));
    let gap_y = b.y.saturating_sub(a.bottom()).max(a.y.saturating_sub(b.bottom()));
    gap_x.max(gap_y)
}

/// Repeatedly merge the first pair accepted by `should_merge` until none is
/// left. Each merge removes one region, so this runs at most `n - 1` times.
pub fn merge_while<F>(mut regions: Vec<MaskRegion>, mut should_merge: F) -> (Vec<MaskRegion>, usize)
where
    F: FnMut(&MaskRegion, &MaskRegion) -> bool,
{
    let mut merges = 0;
    'outer: loop {
        for i in 0..regions.len() {
            for j in i + 1..regions.len() {
                if should_merge(&regions[i], &regions[j]) {
                    let other = regions.remove(j);
                    regions[i] = regions[i].merged(&other);
                    merges += 1;
                    continue 'outer;
                }
            }
        }
        break;
    }
    (regions, merges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: u32, y: u32, w: u32, h: u32) -> MaskRegion {
        let bounds = Rect::new(x, y, w, h).unwrap();
        MaskRegion {
            bounds,
            pixel_count: bounds.area() as usize,
            centroid: bounds.center(),
            confidence: 1.0,
        }
    }

    #[test]
    fn gap_between_boxes() {
        let a = Rect::new(0, 0, 10, 10).unwrap();
        assert_eq!(box_gap(&a, &Rect::new(10, 0, 5, 5).unwrap()), 0);
        assert_eq!(box_gap(&a, &Rect::new(13, 2, 5, 5).unwrap()), 3);
        assert_eq!(box_gap(&Rect::new(13, 2, 5, 5).unwrap(), &a), 3);
        assert_eq!(box_gap(&a, &Rect::new(2, 2, 3, 3).unwrap()), 0);
    }

    #[test]
    fn merge_while_collapses_chains() {
        let regions = vec![region(0, 0, 4, 4), region(5, 0, 4, 4), region(10, 0, 4, 4)];
        let (merged, merges) = merge_while(regions, |a, b| box_gap(&a.bounds, &b.bounds) <= 1);
        assert_eq!(merges, 2);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].bounds, Rect::new(0, 0, 14, 4).unwrap());
        assert_eq!(merged[0].pixel_count, 48);
    }
}
