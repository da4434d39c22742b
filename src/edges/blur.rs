//! Separable Gaussian smoothing with replicate borders.
//!
//! The same kernel type drives pre-edge blurring, alpha feathering and
//! edge-pixel smoothing during cutout assembly.
use crate::image::{ImageF32, Plane, PlaneMut};

/// Trait implemented by separable 1D filters.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order). The kernel is assumed to
    /// have an odd length with its centre in the middle.
    fn taps(&self) -> &[f32];
}

/// Normalised sampled Gaussian.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianKernel {
    taps: Vec<f32>,
}

impl GaussianKernel {
    /// Kernel of `size` taps (forced odd, at least 1) with σ = size / 3.
    pub fn with_size(size: usize) -> Self {
        let size = size.max(1) | 1;
        Self::with_sigma(size, size as f32 / 3.0)
    }

    /// Kernel of `size` taps (forced odd) with an explicit σ.
    pub fn with_sigma(size: usize, sigma: f32) -> Self {
        let size = size.max(1) | 1;
        let half = (size / 2) as isize;
        let sigma = sigma.max(1e-3);
        let denom = 2.0 * sigma * sigma;
        let mut taps: Vec<f32> = (-half..=half)
            .map(|i| (-((i * i) as f32) / denom).exp())
            .collect();
        let sum: f32 = taps.iter().sum();
        for t in &mut taps {
            *t /= sum;
        }
        Self { taps }
    }

    /// Feathering kernel covering `radius` pixels on each side.
    pub fn for_radius(radius: u32) -> Self {
        let size = 2 * radius as usize + 1;
        Self::with_sigma(size, (radius as f32 * 0.5).max(0.5))
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_identity(&self) -> bool {
        self.taps.len() == 1
    }
}

impl SeparableFilter for GaussianKernel {
    #[inline]
    fn taps(&self) -> &[f32] {
        &self.taps
    }
}

/// Simple wrapper around a static filter kernel.
#[derive(Clone, Copy, Debug)]
pub struct StaticSeparableFilter {
    taps: &'static [f32],
}

impl StaticSeparableFilter {
    pub const fn new(taps: &'static [f32]) -> Self {
        Self { taps }
    }
}

impl SeparableFilter for StaticSeparableFilter {
    #[inline]
    fn taps(&self) -> &[f32] {
        self.taps
    }
}

/// Normalised 3-tap binomial `[1, 2, 1] / 4`; its outer product is the
/// 3×3 Gaussian used for anti-aliasing.
pub const BINOMIAL_3TAP: StaticSeparableFilter = StaticSeparableFilter::new(&[0.25, 0.5, 0.25]);

/// Horizontal then vertical pass with clamped borders.
pub fn separable_blur<F: SeparableFilter + ?Sized>(src: &ImageF32, filter: &F) -> ImageF32 {
    let taps = filter.taps();
    if taps.len() <= 1 || src.w == 0 || src.h == 0 {
        return src.clone();
    }
    let half = (taps.len() / 2) as isize;

    let mut horiz = ImageF32::new(src.w, src.h);
    for y in 0..src.h {
        let out = horiz.row_mut(y);
        for (x, o) in out.iter_mut().enumerate() {
            *o = taps
                .iter()
                .enumerate()
                .map(|(k, &t)| src.clamped(x as isize + k as isize - half, y as isize) * t)
                .sum();
        }
    }

    let mut out = ImageF32::new(src.w, src.h);
    for y in 0..src.h {
        for (k, &t) in taps.iter().enumerate() {
            let yy = (y as isize + k as isize - half).clamp(0, src.h as isize - 1) as usize;
            let src_row = horiz.row(yy);
            let dst_row = out.row_mut(y);
            for (d, &s) in dst_row.iter_mut().zip(src_row) {
                *d += s * t;
            }
        }
    }
    out
}

/// Gaussian blur with kernel `size` and σ = size / 3.
pub fn gaussian_blur(src: &ImageF32, size: usize) -> ImageF32 {
    separable_blur(src, &GaussianKernel::with_size(size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalised_and_symmetric() {
        let k = GaussianKernel::with_size(5);
        assert_eq!(k.len(), 5);
        let sum: f32 = k.taps().iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!((k.taps()[0] - k.taps()[4]).abs() < 1e-7);
        assert!(k.taps()[2] > k.taps()[1]);
        assert_eq!(GaussianKernel::with_size(4).len(), 5);
    }

    #[test]
    fn blur_preserves_constant_image() {
        let img = ImageF32::from_fn(9, 7, |_, _| 42.0);
        let out = gaussian_blur(&img, 5);
        assert!(out.data.iter().all(|&v| (v - 42.0).abs() < 1e-3));
    }

    #[test]
    fn radius_zero_kernel_is_identity() {
        assert!(GaussianKernel::for_radius(0).is_identity());
    }
}
