//! Alpha mask generation, feathering and anti-aliasing.
use super::options::AlphaFill;
use crate::edges::{separable_blur, GaussianKernel, SeparableFilter, BINOMIAL_3TAP};
use crate::image::{ForegroundParams, ImageF32, RasterImage};
use crate::types::Rect;

/// Alpha over `rect` (row-major, `rect.width × rect.height`).
pub fn build_alpha(
    image: &RasterImage,
    rect: &Rect,
    fill: AlphaFill,
    params: &ForegroundParams,
) -> Vec<u8> {
    match fill {
        AlphaFill::Rectangle => vec![255; rect.area() as usize],
        AlphaFill::Silhouette => {
            let mut alpha = Vec::with_capacity(rect.area() as usize);
            for y in rect.y..rect.bottom() {
                for x in rect.x..rect.right() {
                    let px = image.pixel(x, y);
                    let on = image.is_foreground(x, y, params);
                    alpha.push(if on { px[3] } else { 0 });
                }
            }
            alpha
        }
    }
}

fn blur_alpha<F: SeparableFilter + ?Sized>(alpha: &[u8], w: usize, h: usize, filter: &F) -> Vec<u8> {
    let plane = ImageF32::from_fn(w, h, |x, y| alpha[y * w + x] as f32);
    separable_blur(&plane, filter)
        .data
        .iter()
        .map(|&v| v.round().clamp(0.0, 255.0) as u8)
        .collect()
}

/// Gaussian feathering over `radius` pixels. Radius 0 returns the mask
/// unchanged.
pub fn feather(alpha: &[u8], w: usize, h: usize, radius: u32) -> Vec<u8> {
    if radius == 0 || w == 0 || h == 0 {
        return alpha.to_vec();
    }
    blur_alpha(alpha, w, h, &GaussianKernel::for_radius(radius))
}

/// 3×3 Gaussian-weighted neighbourhood average.
pub fn anti_alias(alpha: &[u8], w: usize, h: usize) -> Vec<u8> {
    if w == 0 || h == 0 {
        return alpha.to_vec();
    }
    blur_alpha(alpha, w, h, &BINOMIAL_3TAP)
}
