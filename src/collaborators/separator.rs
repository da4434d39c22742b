//! Morphological separation: clean the foreground mask with a sequence of
//! binary operations, then split it into connected regions.
use super::{MorphOptions, MorphSeparation, MorphSeparator, SeparatedRegion};
use crate::deadline::Deadline;
use crate::error::Result;
use crate::image::{ForegroundParams, RasterImage};
use crate::segmentation::{connected_components, foreground_mask, morph, Connectivity};

#[derive(Clone, Debug, Default)]
pub struct MorphologicalSeparator {
    pub foreground: ForegroundParams,
}

impl MorphSeparator for MorphologicalSeparator {
    fn separate(
        &self,
        image: &RasterImage,
        options: &MorphOptions,
        deadline: &Deadline,
    ) -> Result<MorphSeparation> {
        let mut mask = foreground_mask(image, &self.foreground);
        for _ in 0..options.iterations.max(1) {
            for &op in &options.operations {
                deadline.check("morphology.op")?;
                mask = morph::apply(&mask, op, &options.structuring_element);
            }
        }

        let separated_regions: Vec<SeparatedRegion> = connected_components(&mask, Connectivity::C8)
            .into_iter()
            .filter(|c| {
                c.pixel_count >= options.min_region_size && c.pixel_count <= options.max_region_size
            })
            .map(|c| SeparatedRegion {
                bounds: c.bounds,
                area: c.pixel_count as f32,
                confidence: (0.5 + 0.5 * c.density()).min(1.0),
            })
            .collect();

        let confidence = if separated_regions.is_empty() {
            0.0
        } else {
            separated_regions.iter().map(|r| r.confidence).sum::<f32>()
                / separated_regions.len() as f32
        };
        Ok(MorphSeparation {
            separated_regions,
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rect;
    use std::time::Duration;

    #[test]
    fn opening_splits_blobs_joined_by_thin_bridge() {
        let (w, h) = (40u32, 20u32);
        let mut data = vec![0u8; (w * h * 4) as usize];
        let mut paint = |x: u32, y: u32| {
            let i = ((y * w + x) * 4) as usize;
            data[i..i + 4].copy_from_slice(&[10, 120, 10, 255]);
        };
        for y in 5..15 {
            for x in 2..12 {
                paint(x, y);
            }
            for x in 25..35 {
                paint(x, y);
            }
        }
        for x in 12..25 {
            paint(x, 10);
        }
        let img = RasterImage::from_rgba(w, h, data).unwrap();
        let sep = MorphologicalSeparator::default()
            .separate(&img, &MorphOptions::default(), &Deadline::none())
            .unwrap();
        assert_eq!(sep.separated_regions.len(), 2);
        assert_eq!(sep.separated_regions[0].bounds, Rect::new(2, 5, 10, 10).unwrap());
        assert!(sep.confidence > 0.9);
    }

    #[test]
    fn expired_deadline_stops_the_operation_sequence() {
        let img = RasterImage::transparent(16, 16).unwrap();
        let err = MorphologicalSeparator::default()
            .separate(
                &img,
                &MorphOptions::default(),
                &Deadline::after(Duration::ZERO),
            )
            .unwrap_err();
        assert!(err.is_interrupt());
    }
}
