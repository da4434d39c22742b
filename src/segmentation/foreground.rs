//! Binary foreground mask construction.
use crate::image::{ForegroundParams, Mask, RasterImage};

/// Mask of pixels whose alpha is above the floor and which are not
/// near-white.
pub fn foreground_mask(image: &RasterImage, params: &ForegroundParams) -> Mask {
    Mask::from_fn(image.width() as usize, image.height() as usize, |x, y| {
        image.is_foreground(x as u32, y as u32, params)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_marks_opaque_colored_pixels() {
        let mut data = vec![0u8; 12];
        data[0..4].copy_from_slice(&[200, 0, 0, 255]);
        data[4..8].copy_from_slice(&[255, 255, 255, 255]);
        data[8..12].copy_from_slice(&[200, 0, 0, 5]);
        let img = RasterImage::from_rgba(3, 1, data).unwrap();
        let mask = foreground_mask(&img, &ForegroundParams::default());
        assert_eq!(mask.data, vec![255, 0, 0]);
    }
}
