//! Contracts of the segmentation services consumed by fusion, plus
//! reference implementations.
//!
//! The fusion engine only depends on the traits below. The bundled
//! [`KMeansColorSegmenter`] and [`MorphologicalSeparator`] make the crate
//! usable on its own; production deployments may swap in remote services.
//! No vision-model refiner ships with the crate.
use crate::deadline::Deadline;
use crate::error::Result;
use crate::image::RasterImage;
use crate::segmentation::{MorphOp, StructuringElement};
use crate::types::{Pixel, Rect, SpriteType};
use serde::{Deserialize, Serialize};

mod kmeans;
mod separator;

pub use kmeans::KMeansColorSegmenter;
pub use separator::MorphologicalSeparator;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    #[default]
    Rgb,
    Hsv,
}

/// Input of [`ColorSegmenter::segment`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSegmentOptions {
    pub k: usize,
    pub max_iterations: usize,
    /// Largest centroid shift (colour units) still considered converged.
    pub convergence_threshold: f32,
    pub color_space: ColorSpace,
    /// Pixels with alpha <= this are ignored.
    pub alpha_threshold: u8,
}

impl Default for ColorSegmentOptions {
    fn default() -> Self {
        Self {
            k: 4,
            max_iterations: 20,
            convergence_threshold: 1.0,
            color_space: ColorSpace::Rgb,
            alpha_threshold: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColorCluster {
    pub pixels: Vec<Pixel>,
    pub size: usize,
    /// Mean alpha of member pixels, 0..=255.
    pub average_alpha: f32,
    /// Share of all clustered pixels, 0..=1.
    pub dominance: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorSegmentation {
    pub clusters: Vec<ColorCluster>,
    pub confidence: f32,
}

/// Color-cluster segmentation service.
///
/// Implementations check `deadline` inside their long loops and return its
/// error unchanged.
pub trait ColorSegmenter: Send + Sync {
    fn segment(
        &self,
        image: &RasterImage,
        options: &ColorSegmentOptions,
        deadline: &Deadline,
    ) -> Result<ColorSegmentation>;
}

/// Input of [`MorphSeparator::separate`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphOptions {
    pub operations: Vec<MorphOp>,
    pub structuring_element: StructuringElement,
    pub iterations: usize,
    pub min_region_size: usize,
    pub max_region_size: usize,
}

impl Default for MorphOptions {
    fn default() -> Self {
        Self {
            operations: vec![MorphOp::Open],
            structuring_element: StructuringElement::default(),
            iterations: 1,
            min_region_size: 50,
            max_region_size: 1_000_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeparatedRegion {
    pub bounds: Rect,
    pub area: f32,
    pub confidence: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MorphSeparation {
    pub separated_regions: Vec<SeparatedRegion>,
    pub confidence: f32,
}

/// Morphological (watershed-style) separation service.
pub trait MorphSeparator: Send + Sync {
    fn separate(
        &self,
        image: &RasterImage,
        options: &MorphOptions,
        deadline: &Deadline,
    ) -> Result<MorphSeparation>;
}

/// Sprite summary sent to a vision model.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteSummary {
    pub id: usize,
    pub bounds: Rect,
    pub sprite_type: SpriteType,
    pub confidence: f32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementRequest {
    pub prompt: String,
    pub expected_count: usize,
    pub sprites: Vec<SpriteSummary>,
}

/// Advisory confidence for one sprite.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceAdjustment {
    pub id: usize,
    pub confidence: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RefinementAdvice {
    pub adjustments: Vec<ConfidenceAdjustment>,
}

/// Optional vision-model reviewer. Advisory only: it can re-score sprites
/// but never adds or reshapes them.
pub trait ModelRefiner: Send + Sync {
    fn refine(&self, image: &RasterImage, request: &RefinementRequest) -> Result<RefinementAdvice>;
}
