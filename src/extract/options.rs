//! Knobs of the precision layer extractor.
use crate::edges::MAX_CONTOUR_POINTS;
use crate::image::ForegroundParams;
use crate::segmentation::StructuringElement;
use serde::{Deserialize, Serialize};

/// Extraction precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrecisionMode {
    /// Sobel threshold boundary, feathered alpha.
    #[default]
    Standard,
    /// Canny boundary gated by an opened foreground mask, region growing
    /// from the contour hint, content-aware fill, anti-aliasing and edge
    /// smoothing.
    Surgical,
}

impl PrecisionMode {
    pub fn default_padding(self) -> u32 {
        match self {
            PrecisionMode::Standard => 5,
            PrecisionMode::Surgical => 20,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrecisionMode::Standard => "standard",
            PrecisionMode::Surgical => "surgical",
        }
    }
}

/// How the alpha mask is populated inside the refined box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlphaFill {
    /// Source alpha of foreground pixels, 0 elsewhere.
    #[default]
    Silhouette,
    /// Every pixel of the refined box is opaque.
    Rectangle,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOptions {
    pub mode: PrecisionMode,
    /// ROI padding in pixels; `None` uses the mode default.
    pub padding: Option<u32>,
    /// Sobel magnitude counted as an edge in standard mode.
    pub sobel_threshold: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    pub canny_blur_size: usize,
    /// Element of the denoising open in surgical mode.
    pub open_element: StructuringElement,
    /// Edge components must reach within this many pixels of the
    /// approximate box to count.
    pub edge_margin: u32,
    /// Largest RGB distance to the seed colour accepted by region growing.
    pub region_grow_threshold: f32,
    pub alpha_fill: AlphaFill,
    /// Gaussian feather radius in pixels; 0 disables feathering.
    pub feather_radius: u32,
    /// Window radius of the content-aware fill.
    pub fill_radius: u32,
    /// Douglas–Peucker tolerance in pixels.
    pub simplify_epsilon: f32,
    pub max_contour_points: usize,
    /// Turn angle (degrees) at or above which a contour point is a corner.
    pub corner_angle_deg: f32,
    /// Normalised gradient at or above which a straight point is an edge.
    pub strong_edge: f32,
    pub foreground: ForegroundParams,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            mode: PrecisionMode::Standard,
            padding: None,
            sobel_threshold: 100.0,
            canny_low: 50.0,
            canny_high: 150.0,
            canny_blur_size: 5,
            open_element: StructuringElement::square(3),
            edge_margin: 2,
            region_grow_threshold: 40.0,
            alpha_fill: AlphaFill::Silhouette,
            feather_radius: 2,
            fill_radius: 2,
            simplify_epsilon: 1.5,
            max_contour_points: MAX_CONTOUR_POINTS,
            corner_angle_deg: 45.0,
            strong_edge: 0.5,
            foreground: ForegroundParams::default(),
        }
    }
}

impl ExtractionOptions {
    pub fn surgical() -> Self {
        Self {
            mode: PrecisionMode::Surgical,
            ..Self::default()
        }
    }

    pub fn padding(&self) -> u32 {
        self.padding.unwrap_or_else(|| self.mode.default_padding())
    }
}
