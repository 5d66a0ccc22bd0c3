//! Retry reasons
//!
//! Classified causes for re-attempting an operation.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryReason {
    DoNotRetry,
    Unknown,
    SocketNotAvailable,
    ServiceNotAvailable,
    NodeNotAvailable,
    KvNotMyVbucket,
    KvCollectionOutdated,
    KvErrorMapRetryIndicated,
    KvLocked,
    KvTemporaryFailure,
    KvSyncWriteInProgress,
    KvSyncWriteReCommitInProgress,
    ServiceResponseCodeIndicated,
    SocketClosedWhileInFlight,
    CircuitBreakerOpen,
    QueryPreparedStatementFailure,
    QueryIndexNotFound,
    AnalyticsTemporaryFailure,
    SearchTooManyRequests,
    ViewsTemporaryFailure,
    ViewsNoActivePartition,
}

impl RetryReason {
    /// Retried by every strategy except `None`; these follow topology changes
    pub fn always_retry(self) -> bool {
        matches!(
            self,
            RetryReason::KvNotMyVbucket
                | RetryReason::KvCollectionOutdated
                | RetryReason::ViewsNoActivePartition
        )
    }

    /// The server guarantees no partial effect, so repeating is safe even for
    /// non-idempotent requests
    pub fn allows_non_idempotent_retry(self) -> bool {
        !matches!(
            self,
            RetryReason::DoNotRetry
                | RetryReason::Unknown
                | RetryReason::ServiceResponseCodeIndicated
                | RetryReason::SocketClosedWhileInFlight
        )
    }

    pub fn is_retryable(self) -> bool {
        self != RetryReason::DoNotRetry
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RetryReason::DoNotRetry => "do_not_retry",
            RetryReason::Unknown => "unknown",
            RetryReason::SocketNotAvailable => "socket_not_available",
            RetryReason::ServiceNotAvailable => "service_not_available",
            RetryReason::NodeNotAvailable => "node_not_available",
            RetryReason::KvNotMyVbucket => "kv_not_my_vbucket",
            RetryReason::KvCollectionOutdated => "kv_collection_outdated",
            RetryReason::KvErrorMapRetryIndicated => "kv_error_map_retry_indicated",
            RetryReason::KvLocked => "kv_locked",
            RetryReason::KvTemporaryFailure => "kv_temporary_failure",
            RetryReason::KvSyncWriteInProgress => "kv_sync_write_in_progress",
            RetryReason::KvSyncWriteReCommitInProgress => "kv_sync_write_re_commit_in_progress",
            RetryReason::ServiceResponseCodeIndicated => "service_response_code_indicated",
            RetryReason::SocketClosedWhileInFlight => "socket_closed_while_in_flight",
            RetryReason::CircuitBreakerOpen => "circuit_breaker_open",
            RetryReason::QueryPreparedStatementFailure => "query_prepared_statement_failure",
            RetryReason::QueryIndexNotFound => "query_index_not_found",
            RetryReason::AnalyticsTemporaryFailure => "analytics_temporary_failure",
            RetryReason::SearchTooManyRequests => "search_too_many_requests",
            RetryReason::ViewsTemporaryFailure => "views_temporary_failure",
            RetryReason::ViewsNoActivePartition => "views_no_active_partition",
        }
    }
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
