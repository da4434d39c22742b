//! Pixel-exact boundary refinement inside a padded region of interest.
use super::options::{ExtractionOptions, PrecisionMode};
use crate::deadline::Deadline;
use crate::edges::{canny, sobel_gradients, CannyOutput, Grad};
use crate::error::Result;
use crate::image::{ForegroundParams, ImageF32, Mask, RasterImage};
use crate::segmentation::morph::{dilate, open};
use crate::segmentation::{label_components, Connectivity, StructuringElement};
use crate::types::{Pixel, Rect};
use log::debug;
use std::collections::VecDeque;

/// Edge evidence and refined box of one layer.
#[derive(Clone, Debug)]
pub struct Boundary {
    /// Selected edge pixels, ROI coordinates.
    pub edges: Mask,
    pub grad: Grad,
    /// Refined box, image coordinates. Never empty.
    pub refined: Rect,
    /// No edge touched the approximate box and `refined` is the ROI.
    pub fallback: bool,
}

/// Raw edge map of the ROI in the configured mode.
///
/// Luma is composited over white, so a pale sprite on a transparent canvas
/// barely steps in luma. Edges of the alpha plane are added to catch it; on
/// opaque sheets the alpha plane is flat and contributes nothing.
pub fn edge_map(
    image: &RasterImage,
    roi: &Rect,
    options: &ExtractionOptions,
    deadline: &Deadline,
) -> Result<(Mask, Grad)> {
    let luma: ImageF32 = image.luma(roi);
    let alpha: ImageF32 = image.alpha(roi);
    match options.mode {
        PrecisionMode::Standard => {
            let grad = sobel_gradients(&luma).strongest(&sobel_gradients(&alpha));
            let edges = Mask::from_fn(luma.w, luma.h, |x, y| {
                grad.mag.get(x, y) >= options.sobel_threshold
            });
            Ok((edges, grad))
        }
        PrecisionMode::Surgical => {
            let canny_of = |plane: &ImageF32| {
                canny(
                    plane,
                    options.canny_low,
                    options.canny_high,
                    options.canny_blur_size,
                    deadline,
                )
            };
            let CannyOutput { edges, grad } = canny_of(&luma)?;
            let by_alpha = canny_of(&alpha)?;
            let edges = edges.or(&by_alpha.edges);
            let grad = grad.strongest(&by_alpha.grad);
            deadline.check("extract.denoise")?;
            let fg = roi_foreground(image, roi, &options.foreground);
            let opened = open(&fg, &options.open_element);
            let gate = dilate(&opened, &StructuringElement::square(3));
            Ok((edges.and(&gate), grad))
        }
    }
}

fn roi_foreground(image: &RasterImage, roi: &Rect, params: &ForegroundParams) -> Mask {
    Mask::from_fn(roi.width as usize, roi.height as usize, |x, y| {
        image.is_foreground(roi.x + x as u32, roi.y + y as u32, params)
    })
}

/// Keep only the 8-connected edge components whose box reaches within
/// `margin` pixels of `approx` (ROI coordinates).
pub fn select_edges(edges: &Mask, approx: &Rect, margin: u32) -> Mask {
    let zone = approx.padded(margin, edges.w as u32, edges.h as u32);
    let labeling = label_components(edges, Connectivity::C8);
    let labels: Vec<u32> = labeling
        .components
        .iter()
        .filter(|c| c.bounds.intersects(&zone))
        .map(|c| c.label)
        .collect();
    labeling.mask_of(&labels)
}

/// Refine `approx` (image coordinates) inside `roi`.
pub fn refine_boundary(
    image: &RasterImage,
    roi: &Rect,
    approx: &Rect,
    options: &ExtractionOptions,
    deadline: &Deadline,
) -> Result<Boundary> {
    let (raw, grad) = edge_map(image, roi, options, deadline)?;
    let local = approx.intersection(roi).map(|r| Rect {
        x: r.x - roi.x,
        y: r.y - roi.y,
        ..r
    });
    let edges = match local {
        Some(local) => select_edges(&raw, &local, options.edge_margin),
        None => Mask::new(raw.w, raw.h),
    };
    let (refined, fallback) = match edges.bounding_box() {
        Some(b) => (roi.offset_child(&b), false),
        None => {
            debug!("no edges near {:?}, using ROI {:?}", approx, roi);
            (*roi, true)
        }
    };
    Ok(Boundary {
        edges,
        grad,
        refined,
        fallback,
    })
}

/// Seeded 8-connected flood fill over pixels whose RGB lies within
/// `threshold` of the seed colour. Returns the grown box (image
/// coordinates), or `None` when the seed is outside `roi` or background.
pub fn grow_region(
    image: &RasterImage,
    roi: &Rect,
    seed: Pixel,
    threshold: f32,
    params: &ForegroundParams,
) -> Option<Rect> {
    if !roi.contains(seed.x, seed.y) || !image.is_foreground(seed.x, seed.y, params) {
        return None;
    }
    let seed_px = image.pixel(seed.x, seed.y);
    let similar = |px: [u8; 4]| {
        let d: f32 = (0..3)
            .map(|c| (px[c] as f32 - seed_px[c] as f32).powi(2))
            .sum::<f32>()
            .sqrt();
        px[3] > params.alpha_floor && d < threshold
    };

    let (w, h) = (roi.width as usize, roi.height as usize);
    let mut seen = vec![false; w * h];
    let local = |x: u32, y: u32| (y - roi.y) as usize * w + (x - roi.x) as usize;
    let mut queue = VecDeque::from([seed]);
    seen[local(seed.x, seed.y)] = true;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (seed.x, seed.y, seed.x, seed.y);
    while let Some(p) = queue.pop_front() {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (p.x as i64 + dx, p.y as i64 + dy);
                if nx < 0 || ny < 0 || !roi.contains(nx as u32, ny as u32) {
                    continue;
                }
                let (nx, ny) = (nx as u32, ny as u32);
                let i = local(nx, ny);
                if !seen[i] && similar(image.pixel(nx, ny)) {
                    seen[i] = true;
                    queue.push_back(Pixel::new(nx, ny));
                }
            }
        }
    }
    Some(Rect::from_extents(min_x, min_y, max_x, max_y))
}
