//! Retry Orchestrator Tests
//!
//! Tests for the decision table and backoff schedule.

use std::time::Duration;

use mcbp_core::context::{ErrorContext, RetryReason};
use mcbp_core::retry::{
    controlled_backoff, RetryContext, RetryDecision, RetryOrchestrator, RetryStrategy,
};

const ALL_REASONS: [RetryReason; 21] = [
    RetryReason::DoNotRetry,
    RetryReason::Unknown,
    RetryReason::SocketNotAvailable,
    RetryReason::ServiceNotAvailable,
    RetryReason::NodeNotAvailable,
    RetryReason::KvNotMyVbucket,
    RetryReason::KvCollectionOutdated,
    RetryReason::KvErrorMapRetryIndicated,
    RetryReason::KvLocked,
    RetryReason::KvTemporaryFailure,
    RetryReason::KvSyncWriteInProgress,
    RetryReason::KvSyncWriteReCommitInProgress,
    RetryReason::ServiceResponseCodeIndicated,
    RetryReason::SocketClosedWhileInFlight,
    RetryReason::CircuitBreakerOpen,
    RetryReason::QueryPreparedStatementFailure,
    RetryReason::QueryIndexNotFound,
    RetryReason::AnalyticsTemporaryFailure,
    RetryReason::SearchTooManyRequests,
    RetryReason::ViewsTemporaryFailure,
    RetryReason::ViewsNoActivePartition,
];

// =============================================================================
// Strategy None
// =============================================================================

#[test]
fn test_none_never_retries() {
    for idempotent in [true, false] {
        let retry = RetryContext::never(idempotent);
        let mut ctx = ErrorContext::new();

        for reason in ALL_REASONS {
            assert_eq!(
                RetryOrchestrator::maybe_retry(&mut ctx, &retry, reason),
                RetryDecision::Stop
            );
        }
        assert_eq!(ctx.retry_attempts(), 0);
        assert!(ctx.retry_reasons().is_empty());
    }
}

// =============================================================================
// Strategy BestEffort
// =============================================================================

#[test]
fn test_best_effort_declines_unsafe_non_idempotent_retry() {
    let retry = RetryContext::best_effort(false);

    for reason in [
        RetryReason::SocketClosedWhileInFlight,
        RetryReason::Unknown,
        RetryReason::ServiceResponseCodeIndicated,
        RetryReason::DoNotRetry,
    ] {
        let mut ctx = ErrorContext::new();
        assert_eq!(
            RetryOrchestrator::maybe_retry(&mut ctx, &retry, reason),
            RetryDecision::Stop,
            "{} should not be retried for a non-idempotent request",
            reason
        );
        assert_eq!(ctx.retry_attempts(), 0);
    }
}

#[test]
fn test_best_effort_idempotent_retries_all_but_do_not_retry() {
    let retry = RetryContext::best_effort(true);

    for reason in ALL_REASONS {
        let mut ctx = ErrorContext::new();
        let decision = RetryOrchestrator::maybe_retry(&mut ctx, &retry, reason);

        if reason == RetryReason::DoNotRetry {
            assert_eq!(decision, RetryDecision::Stop);
        } else {
            assert_eq!(decision, RetryDecision::Retry, "{} should be retried", reason);
            assert_eq!(ctx.retry_attempts(), 1);
            assert!(ctx.retried_because_of(reason));
        }
    }
}

#[test]
fn test_best_effort_non_idempotent_safe_reasons() {
    let retry = RetryContext::best_effort(false);

    for reason in [
        RetryReason::KvLocked,
        RetryReason::KvTemporaryFailure,
        RetryReason::SocketNotAvailable,
        RetryReason::KvNotMyVbucket,
    ] {
        assert!(RetryOrchestrator::allows(&retry, reason), "{}", reason);
    }
}

// =============================================================================
// Strategy FailFast
// =============================================================================

#[test]
fn test_fail_fast_only_topology_reasons() {
    for idempotent in [true, false] {
        let retry = RetryContext::fail_fast(idempotent);

        for reason in ALL_REASONS {
            assert_eq!(
                RetryOrchestrator::allows(&retry, reason),
                reason.always_retry(),
                "{}",
                reason
            );
        }
    }
}

#[test]
fn test_full_decision_table() {
    for strategy in [
        RetryStrategy::None,
        RetryStrategy::BestEffort,
        RetryStrategy::FailFast,
    ] {
        for idempotent in [true, false] {
            let retry = RetryContext::new(strategy, idempotent);
            for reason in ALL_REASONS {
                let expected = match strategy {
                    RetryStrategy::None => false,
                    RetryStrategy::FailFast => reason.always_retry(),
                    RetryStrategy::BestEffort => {
                        reason.is_retryable()
                            && (idempotent || reason.allows_non_idempotent_retry())
                    }
                };
                assert_eq!(RetryOrchestrator::allows(&retry, reason), expected);
            }
        }
    }
}

#[test]
fn test_always_retry_implies_safe_for_non_idempotent() {
    for reason in ALL_REASONS {
        if reason.always_retry() {
            assert!(reason.allows_non_idempotent_retry());
            assert!(reason.is_retryable());
        }
    }
}

// =============================================================================
// Backoff Tests
// =============================================================================

#[test]
fn test_controlled_backoff_schedule() {
    let expected_ms = [1, 10, 50, 100, 500, 1000, 1000];
    for (attempt, ms) in expected_ms.iter().enumerate() {
        assert_eq!(
            controlled_backoff(attempt as u32),
            Duration::from_millis(*ms)
        );
    }
    assert_eq!(controlled_backoff(u32::MAX), Duration::from_millis(1000));
}
