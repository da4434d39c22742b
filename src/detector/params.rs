//! Parameter types configuring the detector strategies.
//!
//! Every struct deserialises with `#[serde(default)]`, so a JSON config only
//! needs the fields it overrides. Defaults are empirical constants tuned on
//! flat-coloured sprite sheets.
use crate::fusion::FusionOptions;
use crate::image::ForegroundParams;
use serde::{Deserialize, Serialize};

/// Detection strategies in fallback order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
    Baseline,
    Fusion,
    Legacy,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Baseline => "baseline",
            Strategy::Fusion => "fusion",
            Strategy::Legacy => "legacy",
        }
    }
}

/// Detector-wide parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// Number of sprites the sheet is expected to hold.
    pub expected_count: usize,
    /// Strategies tried in order until one yields a sprite.
    pub strategies: Vec<Strategy>,
    pub foreground: ForegroundParams,
    pub baseline: BaselineParams,
    pub legacy: LegacyParams,
    pub reconcile: ReconcileParams,
    /// Options of the fusion strategy. Model refinement is always disabled
    /// when fusion runs as a detector fallback.
    pub fusion: FusionOptions,
    /// A region at least this many times larger (pixel count) than the
    /// runner-up is labelled a symbol.
    pub dominance_ratio: f32,
    /// Optional processing budget in milliseconds.
    pub budget_ms: Option<u64>,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            expected_count: 5,
            strategies: vec![Strategy::Baseline, Strategy::Fusion, Strategy::Legacy],
            foreground: ForegroundParams::default(),
            baseline: BaselineParams::default(),
            legacy: LegacyParams::default(),
            reconcile: ReconcileParams::default(),
            fusion: FusionOptions::default(),
            dominance_ratio: 1.5,
            budget_ms: None,
        }
    }
}

/// Size and density gates of the baseline strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineParams {
    /// Absolute lower bound on component size, px.
    pub min_pixels: usize,
    /// Lower bound on component size relative to the image area.
    pub min_area_fraction: f32,
    /// Components covering more than this share of the image are rejected.
    pub max_area_fraction: f32,
    /// Foreground pixels over bounding-box area.
    pub min_density: f32,
    /// Components whose boxes are at most this many pixels apart merge.
    pub merge_gap: u32,
}

impl Default for BaselineParams {
    fn default() -> Self {
        Self {
            min_pixels: 64,
            min_area_fraction: 0.0002,
            max_area_fraction: 0.9,
            min_density: 0.1,
            merge_gap: 2,
        }
    }
}

/// Spatial-band heuristic of the legacy strategy.
///
/// The top band is assumed to hold auxiliary letters, the overlapping
/// bottom band the main glyph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyParams {
    /// Height of the top band relative to the image.
    pub top_band_fraction: f32,
    /// Start row of the bottom band relative to the image height.
    pub bottom_band_start: f32,
    pub top_min_pixels: usize,
    /// Relative to the image area.
    pub top_max_fraction: f32,
    pub bottom_min_pixels: usize,
    pub bottom_max_fraction: f32,
    /// Fewer band regions than this switches to whole-image components.
    pub min_band_regions: usize,
    pub min_density: f32,
    /// Regions whose centroids are closer than this (px) merge.
    pub merge_distance: f32,
}

impl Default for LegacyParams {
    fn default() -> Self {
        Self {
            top_band_fraction: 0.5,
            bottom_band_start: 0.4,
            top_min_pixels: 30,
            top_max_fraction: 0.25,
            bottom_min_pixels: 200,
            bottom_max_fraction: 0.9,
            min_band_regions: 4,
            min_density: 0.15,
            merge_distance: 25.0,
        }
    }
}

/// Knobs of the merge-toward-expected-count pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileParams {
    /// Regions below this many pixels are discarded as noise.
    pub noise_floor: usize,
    /// Pixel-count share of the largest region that makes a region large.
    pub large_fraction: f32,
    /// Pixel-count share of the largest region that makes a region medium.
    pub medium_fraction: f32,
    /// Regions whose centroid lies above this share of the image height
    /// are in the letter band; the rest are in the icon band.
    pub letter_band_fraction: f32,
    /// Pair merges are only allowed below this share of the image diagonal.
    pub max_merge_distance_fraction: f32,
}

impl Default for ReconcileParams {
    fn default() -> Self {
        Self {
            noise_floor: 20,
            large_fraction: 0.5,
            medium_fraction: 0.1,
            letter_band_fraction: 0.5,
            max_merge_distance_fraction: 0.25,
        }
    }
}
