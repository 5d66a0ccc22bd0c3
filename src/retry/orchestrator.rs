//! Retry orchestration

use std::time::Duration;

use crate::context::{ErrorContext, RetryReason};
use super::{RetryContext, RetryStrategy};

/// Backoff steps used by the executor between attempts (milliseconds)
const BACKOFF_STEPS_MS: [u64; 6] = [1, 10, 50, 100, 500, 1000];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// The retry was recorded; dispatch again
    Retry,

    /// Terminal; surface the failure
    Stop,
}

/// Stateless decision engine
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryOrchestrator;

impl RetryOrchestrator {
    /// Decide whether to retry after a failure classified as `reason`
    ///
    /// A `Retry` decision has already been recorded in `ctx` when this
    /// returns; `Stop` leaves `ctx` untouched.
    pub fn maybe_retry(
        ctx: &mut ErrorContext,
        retry: &RetryContext,
        reason: RetryReason,
    ) -> RetryDecision {
        let decision = if Self::allows(retry, reason) {
            ctx.record_retry(reason);
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        };

        tracing::debug!(
            "Retry decision for {} (strategy={:?}, idempotent={}, attempts={}): {:?}",
            reason,
            retry.strategy(),
            retry.idempotent(),
            ctx.retry_attempts(),
            decision
        );
        decision
    }

    /// Pure form of the decision table
    pub fn allows(retry: &RetryContext, reason: RetryReason) -> bool {
        match retry.strategy() {
            RetryStrategy::None => false,
            RetryStrategy::FailFast => reason.always_retry(),
            RetryStrategy::BestEffort => {
                reason.is_retryable()
                    && (retry.idempotent() || reason.allows_non_idempotent_retry())
            }
        }
    }
}

/// Delay before the retry following `retry_attempts` recorded retries
pub fn controlled_backoff(retry_attempts: u32) -> Duration {
    let index = (retry_attempts as usize).min(BACKOFF_STEPS_MS.len() - 1);
    Duration::from_millis(BACKOFF_STEPS_MS[index])
}
