use crate::detector::{DetectionOutcome, ReconcileStats, Strategy};
use crate::diagnostics::TimingBreakdown;
use crate::fusion::{QualityMetrics, RegionCounts};
use serde::Serialize;

/// Result produced by [`SpriteDetector::detect`](crate::SpriteDetector).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub outcome: DetectionOutcome,
    pub trace: PipelineTrace,
}

impl DetectionReport {
    pub fn sprite_count(&self) -> usize {
        match &self.outcome {
            DetectionOutcome::Detected(d) => d.sprites.len(),
            DetectionOutcome::NoSprites { .. } => 0,
        }
    }
}

/// End-to-end trace of one detection call.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
    /// Foreground pixels in the binary mask.
    pub foreground_pixels: usize,
    pub attempts: Vec<StrategyAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fusion: Option<FusionStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<ReconcileStats>,
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: u32,
    pub height: u32,
}

/// One strategy tried by the detector.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAttempt {
    pub strategy: Strategy,
    pub regions: usize,
    pub elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Summary of a fusion fallback run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionStage {
    pub region_counts: RegionCounts,
    pub quality: QualityMetrics,
    pub confidence: f32,
    pub failed: bool,
    pub timings: TimingBreakdown,
}
