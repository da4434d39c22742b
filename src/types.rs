//! Geometry and label types shared by every stage.
//!
//! Pixel space (`Rect`, `Pixel`) is used internally; percentage-of-image
//! space (`PercentRect`, `PercentPoint`) is used at the public boundary.
use crate::error::{Result, SpriteError};
use serde::{Deserialize, Serialize};

/// Integer pixel position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pixel {
    pub x: u32,
    pub y: u32,
}

impl Pixel {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned pixel box. `width` and `height` are always > 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// `None` when either side is zero.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Box covering the inclusive pixel range `[min_x, max_x] × [min_y, max_y]`.
    pub fn from_extents(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        debug_assert!(max_x >= min_x && max_y >= min_y);
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    #[inline]
    pub fn center(&self) -> [f32; 2] {
        [
            self.x as f32 + self.width as f32 * 0.5,
            self.y as f32 + self.height as f32 * 0.5,
        ]
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        (x1 > x0 && y1 > y0).then(|| Rect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    /// Intersection over union in [0, 1].
    pub fn iou(&self, other: &Rect) -> f32 {
        let inter = self.intersection(other).map_or(0, |r| r.area());
        if inter == 0 {
            return 0.0;
        }
        let union = self.area() + other.area() - inter;
        inter as f32 / union as f32
    }

    pub fn center_distance(&self, other: &Rect) -> f32 {
        let a = self.center();
        let b = other.center();
        ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
    }

    /// Grow by `pad` on every side, clamped to a `width × height` image.
    pub fn padded(&self, pad: u32, width: u32, height: u32) -> Rect {
        let x0 = self.x.saturating_sub(pad);
        let y0 = self.y.saturating_sub(pad);
        let x1 = self.right().saturating_add(pad).min(width).max(x0 + 1);
        let y1 = self.bottom().saturating_add(pad).min(height).max(y0 + 1);
        Rect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Translate a box expressed relative to `self` back to the outer frame.
    pub fn offset_child(&self, child: &Rect) -> Rect {
        Rect {
            x: self.x + child.x,
            y: self.y + child.y,
            ..*child
        }
    }

    pub fn to_percent(&self, image_width: u32, image_height: u32) -> PercentRect {
        let w = image_width.max(1) as f64;
        let h = image_height.max(1) as f64;
        PercentRect {
            x: self.x as f64 * 100.0 / w,
            y: self.y as f64 * 100.0 / h,
            width: self.width as f64 * 100.0 / w,
            height: self.height as f64 * 100.0 / h,
        }
    }
}

/// Box in percentage-of-image coordinates (0..=100 on each axis).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PercentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PercentRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convert to pixels, clamping to the image. Boxes that collapse to a
    /// non-positive size after clamping are an input error.
    pub fn to_pixels(&self, image_width: u32, image_height: u32) -> Result<Rect> {
        let w = image_width as f64;
        let h = image_height as f64;
        let x0 = (self.x * w / 100.0).round().clamp(0.0, w) as i64;
        let y0 = (self.y * h / 100.0).round().clamp(0.0, h) as i64;
        let x1 = ((self.x + self.width) * w / 100.0).round().clamp(0.0, w) as i64;
        let y1 = ((self.y + self.height) * h / 100.0).round().clamp(0.0, h) as i64;
        let (bw, bh) = (x1 - x0, y1 - y0);
        if !self.width.is_finite() || !self.height.is_finite() || bw <= 0 || bh <= 0 {
            return Err(SpriteError::DegenerateBounds {
                width: bw,
                height: bh,
            });
        }
        Ok(Rect {
            x: x0 as u32,
            y: y0 as u32,
            width: bw as u32,
            height: bh as u32,
        })
    }
}

/// Point in percentage-of-image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PercentPoint {
    pub x: f64,
    pub y: f64,
}

impl PercentPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn from_pixel(x: f32, y: f32, image_width: u32, image_height: u32) -> Self {
        Self {
            x: x as f64 * 100.0 / image_width.max(1) as f64,
            y: y as f64 * 100.0 / image_height.max(1) as f64,
        }
    }

    /// Pixel under the point, `None` when it falls outside the image.
    pub fn to_pixel(&self, image_width: u32, image_height: u32) -> Option<Pixel> {
        let x = (self.x * image_width as f64 / 100.0).floor();
        let y = (self.y * image_height as f64 / 100.0).floor();
        let inside = x >= 0.0 && y >= 0.0 && x < image_width as f64 && y < image_height as f64;
        inside.then(|| Pixel::new(x as u32, y as u32))
    }
}

/// Coarse geometric sprite label. Not a semantic class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteType {
    Symbol,
    Object,
    Letter,
    Decoration,
}

impl SpriteType {
    /// Sort key used by validation: symbols first.
    pub fn priority(self) -> u8 {
        match self {
            SpriteType::Symbol => 0,
            SpriteType::Object => 1,
            SpriteType::Letter => 2,
            SpriteType::Decoration => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpriteType::Symbol => "symbol",
            SpriteType::Object => "object",
            SpriteType::Letter => "letter",
            SpriteType::Decoration => "decoration",
        }
    }
}

/// Technique that produced a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceAlgorithm {
    Edge,
    Color,
    Morphology,
    Model,
}
