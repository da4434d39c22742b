//! Processing budget and cooperative cancellation.
//!
//! A [`Deadline`] is cheap to clone and is passed by reference through every
//! stage. Stages call [`Deadline::check`] between passes and every
//! [`ROW_BATCH`] rows inside long pixel loops.
use crate::error::{Result, SpriteError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Number of image rows processed between two deadline checks.
pub const ROW_BATCH: usize = 64;

/// Shared flag a caller can flip to abort an in-flight request.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Deadline {
    expires_at: Option<Instant>,
    budget_ms: u64,
    token: Option<CancelToken>,
}

impl Deadline {
    /// No budget and no cancellation.
    pub fn none() -> Self {
        Self::default()
    }

    /// Expire `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now().checked_add(budget),
            budget_ms: budget.as_millis() as u64,
            token: None,
        }
    }

    /// Build from an optional millisecond budget as found in configs.
    pub fn from_budget_ms(budget_ms: Option<u64>) -> Self {
        match budget_ms {
            Some(ms) => Self::after(Duration::from_millis(ms)),
            None => Self::none(),
        }
    }

    pub fn with_token(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.expires_at.is_none() && self.token.is_none()
    }

    /// Fail if the request was cancelled or the budget is spent.
    pub fn check(&self, stage: &'static str) -> Result<()> {
        if let Some(token) = &self.token {
            if token.is_cancelled() {
                return Err(SpriteError::Cancelled { stage });
            }
        }
        if let Some(expires_at) = self.expires_at {
            if Instant::now() >= expires_at {
                return Err(SpriteError::DeadlineExceeded {
                    stage,
                    budget_ms: self.budget_ms,
                });
            }
        }
        Ok(())
    }

    /// Row-loop helper: only checks on batch boundaries.
    #[inline]
    pub fn check_row(&self, y: usize, stage: &'static str) -> Result<()> {
        if y % ROW_BATCH == 0 && !self.is_unbounded() {
            self.check(stage)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_deadline_never_fails() {
        let deadline = Deadline::none();
        assert!(deadline.check("any").is_ok());
        assert!(deadline.check_row(0, "any").is_ok());
    }

    #[test]
    fn zero_budget_expires_immediately() {
        let deadline = Deadline::after(Duration::ZERO);
        let err = deadline.check("blur").unwrap_err();
        assert!(matches!(
            err,
            SpriteError::DeadlineExceeded { stage: "blur", .. }
        ));
        assert!(err.is_interrupt());
    }

    #[test]
    fn cancelled_token_is_reported() {
        let token = CancelToken::new();
        let deadline = Deadline::none().with_token(token.clone());
        assert!(deadline.check("fusion").is_ok());
        token.cancel();
        assert!(matches!(
            deadline.check("fusion"),
            Err(SpriteError::Cancelled { stage: "fusion" })
        ));
    }
}
