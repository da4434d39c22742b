//! Parameters of the region fusion stage.
//!
//! Defaults are empirical constants tuned for flat-coloured sprite sheets on
//! transparent or near-white backgrounds.
use crate::collaborators::{ColorSegmentOptions, MorphOptions};
use crate::edges::EdgeOptions;
use serde::{Deserialize, Serialize};

/// Static per-algorithm trust used when averaging boxes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmWeights {
    pub edge: f32,
    pub color: f32,
    pub morph: f32,
    /// Blend factor applied to confidences suggested by a model refiner.
    pub model: f32,
}

impl Default for AlgorithmWeights {
    fn default() -> Self {
        Self {
            edge: 0.25,
            color: 0.35,
            morph: 0.4,
            model: 0.5,
        }
    }
}

/// How a multi-member group collapses into one box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FusionStrategy {
    /// Confidence × weight weighted average of x, y, width and height.
    #[default]
    WeightedAverage,
    /// Box of the member with the largest confidence × weight.
    HighestConfidence,
    /// Smallest box containing every member.
    Union,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionOptions {
    pub expected_count: usize,
    pub weights: AlgorithmWeights,
    pub strategy: FusionStrategy,
    /// Overall quality below which a model refiner is consulted.
    pub quality_threshold: f32,
    pub allow_model_refine: bool,
    /// IoU above which two regions describe the same sprite.
    pub overlap_threshold: f32,
    /// Centre distance (px) below which similar-sized regions are grouped.
    pub proximity_threshold: f32,
    /// Relative area difference allowed for proximity grouping.
    pub max_area_difference: f32,
    pub min_confidence: f32,
    /// Absolute bounding-box area range (px²) of returned sprites.
    pub min_area: u64,
    pub max_area: u64,
    /// Extra sprites kept beyond `expected_count`.
    pub count_buffer: usize,
    /// Colour-cluster parts smaller than this (px) are ignored.
    pub min_color_region: usize,
    /// Multiplier turning cluster dominance into a confidence.
    pub color_dominance_gain: f32,
    pub edge: EdgeOptions,
    pub color: ColorSegmentOptions,
    pub morphology: MorphOptions,
}

impl Default for FusionOptions {
    fn default() -> Self {
        Self {
            expected_count: 5,
            weights: AlgorithmWeights::default(),
            strategy: FusionStrategy::WeightedAverage,
            quality_threshold: 0.6,
            allow_model_refine: true,
            overlap_threshold: 0.3,
            proximity_threshold: 20.0,
            max_area_difference: 0.5,
            min_confidence: 0.3,
            min_area: 100,
            max_area: 4_000_000,
            count_buffer: 2,
            min_color_region: 30,
            color_dominance_gain: 4.0,
            edge: EdgeOptions::default(),
            color: ColorSegmentOptions::default(),
            morphology: MorphOptions::default(),
        }
    }
}
