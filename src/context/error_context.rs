//! Error contexts
//!
//! [`ErrorContext`] is the in-flight record owned by a running operation. The
//! dispatch and retry machinery mutates it through `&mut` on every attempt.
//! When the operation completes it is frozen into a [`KeyValueErrorContext`],
//! which callers can only read.

use std::collections::BTreeSet;

use serde_json::json;

use crate::document_id::DocumentId;
use crate::error::{ErrorKind, McbpError, Result};
use crate::protocol::KeyValueStatus;
use super::RetryReason;

/// In-flight outcome, dispatch and retry record of one logical operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    outcome: std::result::Result<(), ErrorKind>,
    last_dispatched_to: Option<String>,
    last_dispatched_from: Option<String>,
    retry_attempts: u32,
    retry_reasons: BTreeSet<RetryReason>,
    /// Reason the retry engine declined, when the operation ended that way
    terminal_reason: Option<RetryReason>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            outcome: Ok(()),
            last_dispatched_to: None,
            last_dispatched_from: None,
            retry_attempts: 0,
            retry_reasons: BTreeSet::new(),
            terminal_reason: None,
        }
    }
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the endpoints of the attempt about to be sent
    ///
    /// Overwrites the previous attempt's endpoints.
    pub fn record_dispatch(&mut self, to: impl Into<String>, from: Option<String>) {
        self.last_dispatched_to = Some(to.into());
        self.last_dispatched_from = from;
    }

    /// Count a retry and remember why it happened
    pub fn record_retry(&mut self, reason: RetryReason) {
        self.retry_attempts += 1;
        self.retry_reasons.insert(reason);
    }

    pub fn succeed(&mut self) {
        self.outcome = Ok(());
        self.terminal_reason = None;
    }

    pub fn fail(&mut self, kind: ErrorKind) {
        self.outcome = Err(kind);
        self.terminal_reason = None;
    }

    /// Fail after the retry engine declined to retry `reason`
    pub fn fail_declined(&mut self, kind: ErrorKind, reason: RetryReason) {
        self.outcome = Err(kind);
        self.terminal_reason = Some(reason);
    }

    pub fn outcome(&self) -> std::result::Result<(), ErrorKind> {
        self.outcome
    }

    pub fn last_dispatched_to(&self) -> Option<&str> {
        self.last_dispatched_to.as_deref()
    }

    pub fn last_dispatched_from(&self) -> Option<&str> {
        self.last_dispatched_from.as_deref()
    }

    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    pub fn retry_reasons(&self) -> &BTreeSet<RetryReason> {
        &self.retry_reasons
    }

    pub fn retried_because_of(&self, reason: RetryReason) -> bool {
        self.retry_reasons.contains(&reason)
    }

    /// Finish the operation and hand the context to the caller
    pub fn freeze(self, details: KeyValueDetails) -> KeyValueErrorContext {
        KeyValueErrorContext {
            inner: self,
            details,
            recontextualized_from: None,
            recontextualized: false,
        }
    }
}

/// Key-value specifics captured alongside the generic context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueDetails {
    pub id: Option<DocumentId>,
    pub opaque: u32,
    pub cas: u64,
    pub status: Option<KeyValueStatus>,
}

impl KeyValueDetails {
    pub fn new(id: Option<DocumentId>) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// Completed, read-only context returned with every key-value response
///
/// Together, `outcome()`, `retry_attempts()` and `last_dispatched_to()` tell
/// apart a request that never reached a server, one that failed after N
/// retries, and one that succeeded after N attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueErrorContext {
    inner: ErrorContext,
    details: KeyValueDetails,
    recontextualized_from: Option<ErrorKind>,
    recontextualized: bool,
}

impl KeyValueErrorContext {
    pub fn outcome(&self) -> std::result::Result<(), ErrorKind> {
        self.inner.outcome
    }

    pub fn is_success(&self) -> bool {
        self.inner.outcome.is_ok()
    }

    pub fn last_dispatched_to(&self) -> Option<&str> {
        self.inner.last_dispatched_to()
    }

    pub fn last_dispatched_from(&self) -> Option<&str> {
        self.inner.last_dispatched_from()
    }

    pub fn retry_attempts(&self) -> u32 {
        self.inner.retry_attempts
    }

    /// Reasons recorded while retrying (empty if never retried)
    pub fn retry_reasons(&self) -> &BTreeSet<RetryReason> {
        &self.inner.retry_reasons
    }

    pub fn retried_because_of(&self, reason: RetryReason) -> bool {
        self.inner.retried_because_of(reason)
    }

    /// Reason the retry engine declined, if that ended the operation
    pub fn terminal_reason(&self) -> Option<RetryReason> {
        self.inner.terminal_reason
    }

    pub fn id(&self) -> Option<&DocumentId> {
        self.details.id.as_ref()
    }

    pub fn opaque(&self) -> u32 {
        self.details.opaque
    }

    pub fn cas(&self) -> u64 {
        self.details.cas
    }

    /// Status of the last response received, if any
    pub fn status(&self) -> Option<KeyValueStatus> {
        self.details.status
    }

    /// Replace the terminal outcome with a more specific error.
    ///
    /// This is the one sanctioned way to change a frozen context. It lets a
    /// higher layer reinterpret a low-level failure (for example a protocol
    /// error from a mechanism listing as an authentication failure) without
    /// re-running the pipeline. It may be applied once; a second call returns
    /// `McbpError::AlreadyRecontextualized`. The replaced outcome stays
    /// available through [`recontextualized_from`](Self::recontextualized_from).
    pub fn recontextualize(mut self, kind: ErrorKind) -> Result<Self> {
        if self.recontextualized {
            return Err(McbpError::AlreadyRecontextualized);
        }
        tracing::debug!(
            "Recontextualizing outcome {:?} as {:?}",
            self.inner.outcome,
            kind
        );
        self.recontextualized_from = self.inner.outcome.err();
        self.inner.outcome = Err(kind);
        self.recontextualized = true;
        Ok(self)
    }

    pub fn is_recontextualized(&self) -> bool {
        self.recontextualized
    }

    /// Failure that was replaced by `recontextualize`; `None` if it replaced a success
    pub fn recontextualized_from(&self) -> Option<ErrorKind> {
        self.recontextualized_from
    }

    /// Convert the outcome into a `Result` for `?`-style callers
    pub fn ensure_success(&self) -> Result<()> {
        let kind = match self.inner.outcome {
            Ok(()) => return Ok(()),
            Err(kind) => kind,
        };

        if let Some(reason) = self.inner.terminal_reason.filter(|r| r.is_retryable()) {
            return Err(McbpError::RetryExhausted {
                reason,
                attempts: self.inner.retry_attempts,
                kind,
            });
        }
        if kind == ErrorKind::RequestCanceled {
            return Err(McbpError::Cancelled);
        }
        Err(McbpError::Operation(kind))
    }

    /// Render the context for logs
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "ec": self.inner.outcome.err(),
            "id": self.details.id,
            "opaque": self.details.opaque,
            "cas": self.details.cas,
            "status_code": self.details.status.map(KeyValueStatus::code),
            "last_dispatched_to": self.inner.last_dispatched_to,
            "last_dispatched_from": self.inner.last_dispatched_from,
            "retry_attempts": self.inner.retry_attempts,
            "retry_reasons": self.inner.retry_reasons,
            "recontextualized_from": self.recontextualized_from,
        })
    }
}
