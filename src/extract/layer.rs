//! Durable output of the extractor.
use super::contour::LayerContour;
use super::options::{AlphaFill, PrecisionMode};
use crate::error::Result;
use crate::image::io::save_rgba_png;
use crate::types::{PercentRect, Rect, SpriteType};
use image::RgbaImage;
use serde::Serialize;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Caller-supplied identity of the layer being extracted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LayerInfo {
    pub id: String,
    pub name: String,
    pub sprite_type: SpriteType,
}

impl LayerInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sprite_type: SpriteType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sprite_type,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    pub method: PrecisionMode,
    pub alpha_fill: AlphaFill,
    pub confidence: f32,
    /// Pixels of the cutout with non-zero alpha.
    pub pixel_count: u64,
    pub boundary_length: f32,
    /// The refined box is the padded ROI because no edge was selected.
    pub fallback: bool,
    /// Unix time of the extraction in milliseconds.
    pub timestamp_ms: u64,
}

pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedLayerData {
    pub id: String,
    pub name: String,
    pub sprite_type: SpriteType,
    pub original_bounds: PercentRect,
    pub refined_bounds: PercentRect,
    pub refined_pixels: Rect,
    pub contour: LayerContour,
    /// Row-major alpha of the cutout, `refined_pixels.width × height`.
    #[serde(skip)]
    pub alpha: Vec<u8>,
    #[serde(skip)]
    pub image: RgbaImage,
    pub metadata: ExtractionMetadata,
}

impl ExtractedLayerData {
    pub fn save_png(&self, path: &Path) -> Result<()> {
        save_rgba_png(&self.image, path)
    }
}
