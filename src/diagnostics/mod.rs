//! Diagnostics data model returned next to detection results.
//!
//! `DetectionReport` is the main entry point returned by the detector,
//! bundling the outcome with a `PipelineTrace` describing every strategy
//! the detector tried.

pub mod pipeline;
pub mod timing;

pub use pipeline::{DetectionReport, FusionStage, InputDescriptor, PipelineTrace, StrategyAttempt};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
