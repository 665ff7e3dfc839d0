use super::error::{Phase, SyncError, SyncFailure};
use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

/// Wall-clock limit of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
    budget_secs: u64,
}

impl Deadline {
    /// Deadline `budget_secs` from now, or `None` if that instant cannot be
    /// represented
    pub fn after(budget_secs: u64) -> Option<Self> {
        Instant::now()
            .checked_add(Duration::from_secs(budget_secs))
            .map(|at| Self { at, budget_secs })
    }

    pub fn has_passed(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Error reported when the deadline passes during `phase`
    pub fn exceeded(&self, phase: Phase) -> SyncError {
        SyncError::new(phase, SyncFailure::TimedOut(self.budget_secs))
    }

    /// Await `fut` unless the deadline passes first
    pub async fn run<F: Future>(&self, phase: Phase, fut: F) -> Result<F::Output, SyncError> {
        timeout_at(self.at, fut)
            .await
            .map_err(|_| self.exceeded(phase))
    }
}
