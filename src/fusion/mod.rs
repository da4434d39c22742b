//! Region fusion: reconcile edge contours, colour clusters and morphology
//! regions into one classified, scored sprite list.
//!
//! Stages
//! - Sources: edge analysis and both segmentation services run under
//!   `rayon::join`.
//! - Adapters: every native result becomes a [`Region`].
//! - Grouping and merge ([`group_regions`], [`merge_group`]).
//! - Classification ([`classify`]) and scoring ([`QualityMetrics`]).
//! - Optional model re-scoring, then [`validate`].

pub mod classify;
pub mod engine;
pub mod grouping;
pub mod options;
pub mod quality;
pub mod region;

pub use classify::classify;
pub use engine::{validate, FusedSprite, FusionResult, RegionCounts, RegionFusionEngine};
pub use grouping::{group_regions, grouping_order, merge_group, FusionMethod, MergedGroup};
pub use options::{AlgorithmWeights, FusionOptions, FusionStrategy};
pub use quality::{evaluate, expected_count_score, QualityMetrics};
pub use region::{color_cluster_parts, ColorClusterPart, Region, RegionProperties, SourceRegion};

#[cfg(test)]
mod tests;
