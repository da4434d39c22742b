//! Crate-wide error type.
//!
//! Only input problems, collaborator failures and budget violations are
//! errors. Degenerate geometry is recovered in place and "nothing found" is
//! reported through [`DetectionOutcome`](crate::detector::DetectionOutcome).
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by detection, fusion and extraction.
#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("image decoding failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("bounds are degenerate after clamping: {width}x{height} px")]
    DegenerateBounds { width: i64, height: i64 },

    #[error("stage `{stage}` failed: {reason}")]
    StageFailed { stage: &'static str, reason: String },

    #[error("collaborator `{name}` failed: {reason}")]
    Collaborator { name: &'static str, reason: String },

    #[error("processing budget of {budget_ms} ms exceeded during `{stage}`")]
    DeadlineExceeded { stage: &'static str, budget_ms: u64 },

    #[error("processing cancelled during `{stage}`")]
    Cancelled { stage: &'static str },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SpriteError {
    /// Budget and cancellation errors stop the whole call instead of
    /// triggering a strategy fallback.
    pub fn is_interrupt(&self) -> bool {
        matches!(
            self,
            SpriteError::DeadlineExceeded { .. } | SpriteError::Cancelled { .. }
        )
    }

    pub(crate) fn collaborator(name: &'static str, reason: impl Into<String>) -> Self {
        SpriteError::Collaborator {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpriteError>;
