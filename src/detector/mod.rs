//! Sprite detector orchestrating the fallback strategies.
//!
//! Overview
//! - Builds a binary foreground mask (alpha above a floor, not near-white).
//! - Baseline: 8-connected components filtered by size and density. Cheap
//!   and deterministic, so it runs first.
//! - Fusion: the [`RegionFusionEngine`](crate::fusion::RegionFusionEngine)
//!   with model refinement disabled.
//! - Legacy: per-band components with density, centroid-merge and overlap
//!   post-filters.
//! - Whichever strategy first yields a region wins; its regions are reduced
//!   toward the expected count, labelled and returned. When every strategy
//!   comes back empty the outcome is [`DetectionOutcome::NoSprites`].
//!
//! Modules
//! - [`params`]: configuration types used by the detector and CLI.
//! - [`baseline`], [`legacy`]: the mask-based strategies.
//! - [`reconcile`]: the merge-toward-expected-count pass.
//! - `pipeline`: the [`SpriteDetector`] implementation.

pub mod baseline;
pub mod legacy;
pub mod params;
mod pipeline;
pub mod reconcile;
pub mod region;

pub use params::{BaselineParams, DetectorParams, LegacyParams, ReconcileParams, Strategy};
pub use pipeline::{label_sprites, DetectedSprite, Detection, DetectionOutcome, SpriteDetector};
pub use reconcile::{reconcile, ReconcileStats};
pub use region::MaskRegion;

#[cfg(test)]
mod tests;
