//! Owned RGBA8 raster, the input of every detection and extraction call.
use super::ImageF32;
use crate::error::{Result, SpriteError};
use crate::types::Rect;
use serde::{Deserialize, Serialize};

/// Pixel classification thresholds shared by mask construction and
/// silhouette alpha.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForegroundParams {
    /// A pixel is foreground only if its alpha is strictly above this.
    pub alpha_floor: u8,
    /// A pixel whose R, G and B are all >= this value counts as background.
    pub white_threshold: u8,
}

impl Default for ForegroundParams {
    fn default() -> Self {
        Self {
            alpha_floor: 10,
            white_threshold: 240,
        }
    }
}

/// Immutable RGBA image. Each call owns its own instance.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterImage {
    /// Wrap a tightly packed RGBA8 buffer.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SpriteError::EmptyImage { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(SpriteError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Fully transparent canvas.
    pub fn transparent(width: u32, height: u32) -> Result<Self> {
        Self::from_rgba(width, height, vec![0; width as usize * height as usize * 4])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn full_rect(&self) -> Rect {
        Rect {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    #[inline]
    pub fn is_foreground(&self, x: u32, y: u32, params: &ForegroundParams) -> bool {
        is_foreground_rgba(self.pixel(x, y), params)
    }

    /// Luma of the region composited over white, in 0..=255.
    pub fn luma(&self, rect: &Rect) -> ImageF32 {
        ImageF32::from_fn(rect.width as usize, rect.height as usize, |x, y| {
            luma_over_white(self.pixel(rect.x + x as u32, rect.y + y as u32))
        })
    }

    /// Alpha channel of the region, in 0..=255.
    pub fn alpha(&self, rect: &Rect) -> ImageF32 {
        ImageF32::from_fn(rect.width as usize, rect.height as usize, |x, y| {
            self.pixel(rect.x + x as u32, rect.y + y as u32)[3] as f32
        })
    }

    /// Copy of a sub-rectangle as a new tightly packed RGBA buffer.
    pub fn crop_rgba(&self, rect: &Rect) -> Vec<u8> {
        let mut out = Vec::with_capacity(rect.area() as usize * 4);
        let stride = self.width as usize * 4;
        for y in rect.y..rect.bottom() {
            let start = y as usize * stride + rect.x as usize * 4;
            out.extend_from_slice(&self.data[start..start + rect.width as usize * 4]);
        }
        out
    }
}

#[inline]
pub fn is_foreground_rgba(px: [u8; 4], params: &ForegroundParams) -> bool {
    let near_white = px[0] >= params.white_threshold
        && px[1] >= params.white_threshold
        && px[2] >= params.white_threshold;
    px[3] > params.alpha_floor && !near_white
}

/// Weighted luma (0.299, 0.587, 0.114) blended over a white backdrop so that
/// transparent regions read as background.
#[inline]
pub fn luma_over_white(px: [u8; 4]) -> f32 {
    let luma = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
    let a = px[3] as f32 / 255.0;
    luma * a + 255.0 * (1.0 - a)
}
