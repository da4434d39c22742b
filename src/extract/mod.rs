//! Precision layer extraction: pixel-exact boundary, annotated contour and
//! an alpha-masked RGBA cutout for one approximate sprite box.
//!
//! Pipeline
//! - Percent bounds to pixels, padded region of interest.
//! - Boundary ([`boundary`]): Sobel threshold (standard) or Canny gated by
//!   an opened foreground mask (surgical). Edge components away from the
//!   approximate box are dropped; no edges means the ROI is kept.
//! - Surgical mode unions a colour region grown from the first hint.
//! - Contour ([`contour`]): border walk, Douglas–Peucker, per-point pressure
//!   and [`PointKind`].
//! - Alpha ([`alpha`]) and assembly ([`assemble`]).

pub mod alpha;
pub mod assemble;
pub mod boundary;
pub mod contour;
mod extractor;
pub mod layer;
pub mod options;

pub use boundary::{grow_region, refine_boundary, Boundary};
pub use contour::{precision_contour, ContourPoint, LayerContour, PointKind};
pub use extractor::LayerExtractor;
pub use layer::{ExtractedLayerData, ExtractionMetadata, LayerInfo};
pub use options::{AlphaFill, ExtractionOptions, PrecisionMode};
