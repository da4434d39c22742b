#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod deadline;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod fusion;
pub mod image;
pub mod split;
pub mod types;

// Building blocks – public, but considered unstable internals.
pub mod collaborators;
pub mod edges;
pub mod segmentation;

// --- High-level re-exports -------------------------------------------------

// Main entry points: detector, fusion engine, extractor and splitter.
pub use crate::detector::{DetectedSprite, Detection, DetectionOutcome, DetectorParams, SpriteDetector};
pub use crate::extract::{ExtractedLayerData, ExtractionOptions, LayerExtractor, LayerInfo, PrecisionMode};
pub use crate::fusion::{FusedSprite, FusionOptions, FusionResult, RegionFusionEngine};
pub use crate::split::{SheetSplitter, SplitOutcome};

// Budgets, errors and diagnostics.
pub use crate::deadline::{CancelToken, Deadline};
pub use crate::diagnostics::{DetectionReport, PipelineTrace};
pub use crate::error::{Result, SpriteError};

// Geometry shared by every stage.
pub use crate::image::RasterImage;
pub use crate::types::{PercentPoint, PercentRect, Pixel, Rect, SourceAlgorithm, SpriteType};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use sprite_splitter::prelude::*;
///
/// # fn main() -> sprite_splitter::Result<()> {
/// let (w, h) = (64u32, 32u32);
/// let mut rgba = vec![0u8; (w * h * 4) as usize];
/// for y in 8..24 {
///     for x in 8..24 {
///         let i = ((y * w + x) * 4) as usize;
///         rgba[i..i + 4].copy_from_slice(&[200, 40, 40, 255]);
///     }
/// }
/// let image = RasterImage::from_rgba(w, h, rgba)?;
///
/// let outcome = SheetSplitter::default().split(&image)?;
/// for layer in &outcome.layers {
///     println!("{} {:?} {:?}", layer.id, layer.sprite_type, layer.refined_pixels);
/// }
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::RasterImage;
    pub use crate::{
        Deadline, DetectionOutcome, DetectorParams, ExtractionOptions, LayerExtractor,
        SheetSplitter, SpriteDetector,
    };
}
