//! Retry strategies

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryStrategy {
    /// Surface every failure immediately
    None,

    /// Retry whatever is retryable for the request's idempotency class
    #[default]
    BestEffort,

    /// Retry only topology-change reasons
    FailFast,
}

/// Retry configuration attached to a request at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryContext {
    strategy: RetryStrategy,
    idempotent: bool,
}

impl RetryContext {
    pub fn new(strategy: RetryStrategy, idempotent: bool) -> Self {
        Self {
            strategy,
            idempotent,
        }
    }

    pub fn best_effort(idempotent: bool) -> Self {
        Self::new(RetryStrategy::BestEffort, idempotent)
    }

    pub fn fail_fast(idempotent: bool) -> Self {
        Self::new(RetryStrategy::FailFast, idempotent)
    }

    pub fn never(idempotent: bool) -> Self {
        Self::new(RetryStrategy::None, idempotent)
    }

    pub fn strategy(&self) -> RetryStrategy {
        self.strategy
    }

    pub fn idempotent(&self) -> bool {
        self.idempotent
    }
}
