//! Canny-style edge map plus contour analysis over a whole raster.
use super::blur::gaussian_blur;
use super::contour::{trace_contours, Contour, MAX_CONTOUR_POINTS};
use super::grad::{sobel_gradients, Grad};
use super::hysteresis::hysteresis;
use super::nms::non_max_suppression;
use crate::deadline::Deadline;
use crate::diagnostics::elapsed_ms;
use crate::error::Result;
use crate::image::{ImageF32, Mask, RasterImage};
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Knobs of the edge analyzer.
///
/// Thresholds are expressed on the Sobel magnitude of 0..=255 luma.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeOptions {
    pub low_threshold: f32,
    pub high_threshold: f32,
    /// Gaussian kernel size (forced odd), σ = size / 3.
    pub blur_size: usize,
    /// Minimum enclosed contour area kept, px².
    pub min_area: f32,
    /// Maximum enclosed contour area kept, px²; `None` is unbounded.
    pub max_area: Option<f32>,
    pub max_contour_points: usize,
    /// Contour count that maps to a full count score.
    pub target_contour_count: usize,
    /// Edge-pixel density multiplier before capping the density score at 1.
    pub density_scale: f32,
}

impl Default for EdgeOptions {
    fn default() -> Self {
        Self {
            low_threshold: 50.0,
            high_threshold: 150.0,
            blur_size: 5,
            min_area: 100.0,
            max_area: None,
            max_contour_points: MAX_CONTOUR_POINTS,
            target_contour_count: 5,
            density_scale: 20.0,
        }
    }
}

/// Output of a Canny pass.
#[derive(Clone, Debug)]
pub struct CannyOutput {
    pub edges: Mask,
    pub grad: Grad,
}

/// Result of [`EdgeAnalyzer::detect`].
#[derive(Clone, Debug)]
pub struct EdgeDetection {
    pub edge_map: Mask,
    pub contours: Vec<Contour>,
    pub edge_pixels: usize,
    pub confidence: f32,
    pub elapsed_ms: f64,
}

/// Whole-image luma (0.299R + 0.587G + 0.114B) composited over white.
pub fn to_luma(image: &RasterImage) -> ImageF32 {
    image.luma(&image.full_rect())
}

/// Blur, Sobel, non-maximum suppression and hysteresis.
pub fn canny(
    luma: &ImageF32,
    low: f32,
    high: f32,
    blur_size: usize,
    deadline: &Deadline,
) -> Result<CannyOutput> {
    let blurred = gaussian_blur(luma, blur_size);
    deadline.check("canny.blur")?;
    let grad = sobel_gradients(&blurred);
    deadline.check("canny.gradient")?;
    let thinned = non_max_suppression(&grad);
    deadline.check("canny.nms")?;
    let edges = hysteresis(&thinned, low, high);
    Ok(CannyOutput { edges, grad })
}

#[derive(Clone, Debug, Default)]
pub struct EdgeAnalyzer {
    options: EdgeOptions,
}

impl EdgeAnalyzer {
    pub fn new(options: EdgeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EdgeOptions {
        &self.options
    }

    /// Edge map, filtered contours and an overall confidence in [0, 1].
    pub fn detect(&self, image: &RasterImage, deadline: &Deadline) -> Result<EdgeDetection> {
        let start = Instant::now();
        let opts = &self.options;
        let luma = to_luma(image);
        deadline.check("edges.luma")?;
        let CannyOutput { edges, .. } = canny(
            &luma,
            opts.low_threshold,
            opts.high_threshold,
            opts.blur_size,
            deadline,
        )?;
        deadline.check("edges.hysteresis")?;

        let edge_pixels = edges.count();
        let contours: Vec<Contour> = trace_contours(&edges, opts.max_contour_points.max(3))
            .into_iter()
            .filter(|c| {
                c.metrics.area >= opts.min_area
                    && opts.max_area.map_or(true, |max| c.metrics.area <= max)
            })
            .collect();

        let total = (edges.w * edges.h).max(1) as f32;
        let density_score = (edge_pixels as f32 / total * opts.density_scale).min(1.0);
        let count_score =
            (contours.len() as f32 / opts.target_contour_count.max(1) as f32).min(1.0);
        let confidence = (density_score + count_score) * 0.5;
        let elapsed = elapsed_ms(start);
        debug!(
            "EdgeAnalyzer::detect edges={} contours={} confidence={:.3} in {:.2} ms",
            edge_pixels,
            contours.len(),
            confidence,
            elapsed
        );

        Ok(EdgeDetection {
            edge_map: edges,
            contours,
            edge_pixels,
            confidence,
            elapsed_ms: elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas_with_square(w: u32, h: u32, x0: u32, y0: u32, side: u32) -> RasterImage {
        let mut data = vec![0u8; (w * h * 4) as usize];
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                let i = ((y * w + x) * 4) as usize;
                data[i..i + 4].copy_from_slice(&[30, 60, 200, 255]);
            }
        }
        RasterImage::from_rgba(w, h, data).unwrap()
    }

    #[test]
    fn blank_canvas_has_no_edges() {
        let img = RasterImage::transparent(32, 32).unwrap();
        let det = EdgeAnalyzer::default().detect(&img, &Deadline::none()).unwrap();
        assert_eq!(det.edge_pixels, 0);
        assert!(det.contours.is_empty());
        assert_eq!(det.confidence, 0.0);
    }

    #[test]
    fn square_yields_contour_around_it() {
        let img = canvas_with_square(64, 64, 16, 16, 30);
        let analyzer = EdgeAnalyzer::new(EdgeOptions {
            min_area: 0.0,
            ..Default::default()
        });
        let det = analyzer.detect(&img, &Deadline::none()).unwrap();
        assert!(det.edge_pixels > 0);
        assert!(!det.contours.is_empty());
        let largest = det
            .contours
            .iter()
            .max_by_key(|c| c.metrics.bounds.area())
            .unwrap();
        let b = largest.metrics.bounds;
        assert!(b.x.abs_diff(16) <= 2 && b.y.abs_diff(16) <= 2, "{b:?}");
        assert!(b.width.abs_diff(30) <= 3 && b.height.abs_diff(30) <= 3, "{b:?}");
        assert!(det.confidence > 0.0 && det.confidence <= 1.0);
    }
}
