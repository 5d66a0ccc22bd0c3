//! Operation executor
//!
//! Drives one logical operation through encode, dispatch, correlation,
//! classification and retry until it reaches a terminal outcome.
//!
//! ## Attempt Loop
//! ```text
//!   cancelled? ──yes──► RequestCanceled
//!       │ no
//!   route ─► encode (fresh opaque) ─► record_dispatch ─► dispatch
//!       │                                                   │
//!       │                    ┌──────────────────────────────┘
//!       │                    ▼
//!       │        correlate ─► parse ─► classify
//!       │                                 │
//!       │           success ◄─────────────┼──────► failure(reason)
//!       │                                 │            │
//!       └──── backoff ◄── Retry ◄── RetryOrchestrator ─┘── Stop ──► terminal
//! ```
//!
//! At most one wire attempt is in flight per operation. Cancellation is
//! observed between attempts and during backoff, never mid-attempt. An
//! attempt that finishes after the token fired has its result discarded.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::context::{ErrorContext, KeyValueDetails, KeyValueErrorContext, RetryReason};
use crate::document_id::DocumentId;
use crate::error::{DispatchError, ErrorKind, Result};
use crate::protocol::{ClientRequest, ClientResponse, CmdInfo, RequestBody, StatusOutcome};
use crate::retry::{controlled_backoff, RetryContext, RetryDecision, RetryOrchestrator, RetryStrategy};
use super::transport::{Router, Transport};

/// Response body type produced by an operation
pub type ResponseOf<Op> = <<Op as KeyValueOperation>::Body as RequestBody>::Response;

/// A logical key-value operation the executor can drive
pub trait KeyValueOperation {
    type Body: RequestBody;
    type Response;

    /// Build the request for one attempt
    fn encode(&self, opaque: u32) -> Result<ClientRequest<Self::Body>>;

    fn partition(&self) -> u16 {
        0
    }

    /// Retry policy for this operation; `default` is the executor's strategy
    fn retry_context(&self, default: RetryStrategy) -> RetryContext;

    /// Per-operation deadline; the executor's configured timeout otherwise
    fn timeout(&self) -> Option<Duration> {
        None
    }

    fn document_id(&self) -> Option<&DocumentId> {
        None
    }

    /// Decide what a parsed response means for this operation
    fn classify(
        &self,
        response: &ClientResponse<<Self::Body as RequestBody>::Response>,
    ) -> StatusOutcome {
        response.status().outcome()
    }

    /// Build the caller-facing response from the frozen context
    fn make_response(
        &self,
        ctx: KeyValueErrorContext,
        response: Option<ClientResponse<<Self::Body as RequestBody>::Response>>,
    ) -> Self::Response;
}

/// Result of one wire attempt
enum Attempt<B: crate::protocol::ResponseBody> {
    /// Terminal; the context outcome is already set
    Completed(Option<ClientResponse<B>>),

    /// Candidate for retry
    Failed {
        kind: ErrorKind,
        reason: RetryReason,
        response: Option<ClientResponse<B>>,
    },

    /// The operation deadline passed
    TimedOut { in_flight: bool },
}

/// Runs operations against a transport
pub struct Executor<T, R> {
    transport: T,
    router: R,
    config: Config,
    next_opaque: AtomicU32,
}

impl<T: Transport, R: Router> Executor<T, R> {
    pub fn new(transport: T, router: R, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            router,
            config,
            next_opaque: AtomicU32::new(1),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn next_opaque(&self) -> u32 {
        self.next_opaque.fetch_add(1, Ordering::Relaxed)
    }

    /// Run `op` to completion
    ///
    /// The returned response always carries a frozen error context; failures
    /// are reported there rather than as an `Err`.
    pub async fn execute<Op: KeyValueOperation>(
        &self,
        op: &Op,
        cancel: &CancellationToken,
    ) -> Op::Response {
        let retry = op.retry_context(self.config.default_retry_strategy);
        let timeout = op.timeout().unwrap_or_else(|| self.config.kv_timeout());
        let deadline = Instant::now() + timeout;

        let mut ctx = ErrorContext::new();
        let mut details = KeyValueDetails::new(op.document_id().cloned());

        let response = loop {
            if cancel.is_cancelled() {
                tracing::debug!(
                    "{:?} cancelled after {} retries",
                    <Op::Body as RequestBody>::OPCODE,
                    ctx.retry_attempts()
                );
                ctx.fail(ErrorKind::RequestCanceled);
                break None;
            }

            let attempt = self.attempt(op, &retry, &mut ctx, &mut details, deadline).await;
            if cancel.is_cancelled() {
                tracing::debug!(
                    "{:?} cancelled while in flight, discarding result",
                    <Op::Body as RequestBody>::OPCODE
                );
                ctx.fail(ErrorKind::RequestCanceled);
                break None;
            }

            let (kind, reason, response) = match attempt {
                Attempt::Completed(response) => break response,
                Attempt::TimedOut { in_flight } => {
                    ctx.fail(timeout_kind(&retry, in_flight));
                    break None;
                }
                Attempt::Failed {
                    kind,
                    reason,
                    response,
                } => (kind, reason, response),
            };

            if RetryOrchestrator::maybe_retry(&mut ctx, &retry, reason) == RetryDecision::Stop {
                ctx.fail_declined(kind, reason);
                break response;
            }

            let backoff = controlled_backoff(ctx.retry_attempts().saturating_sub(1));
            if Instant::now() + backoff >= deadline {
                ctx.fail(timeout_kind(&retry, false));
                break None;
            }

            tokio::select! {
                _ = tokio::time::sleep(backoff) => {}
                _ = cancel.cancelled() => {
                    ctx.fail(ErrorKind::RequestCanceled);
                    break None;
                }
            }
        };

        let ctx = ctx.freeze(details);
        if let Err(kind) = ctx.outcome() {
            tracing::debug!(
                "{:?} failed with {:?} after {} retries (last endpoint {:?})",
                <Op::Body as RequestBody>::OPCODE,
                kind,
                ctx.retry_attempts(),
                ctx.last_dispatched_to()
            );
        }
        op.make_response(ctx, response)
    }

    async fn attempt<Op: KeyValueOperation>(
        &self,
        op: &Op,
        retry: &RetryContext,
        ctx: &mut ErrorContext,
        details: &mut KeyValueDetails,
        deadline: Instant,
    ) -> Attempt<ResponseOf<Op>> {
        let opcode = <Op::Body as RequestBody>::OPCODE;
        let partition = op.partition();

        let Some(endpoint) = self.router.route(partition) else {
            tracing::debug!("No endpoint owns partition {}", partition);
            return Attempt::Failed {
                kind: ErrorKind::ServiceNotAvailable,
                reason: RetryReason::NodeNotAvailable,
                response: None,
            };
        };

        let opaque = self.next_opaque();
        let encoded = op.encode(opaque).and_then(|request| {
            let frame = request.frame();
            frame.header().map(|_| frame)
        });
        let frame = match encoded {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Failed to encode {:?} request: {}", opcode, e);
                ctx.fail(ErrorKind::InvalidArgument);
                return Attempt::Completed(None);
            }
        };
        details.opaque = opaque;

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Attempt::TimedOut { in_flight: false };
        }

        ctx.record_dispatch(endpoint.clone(), self.transport.local_address(&endpoint));
        tracing::debug!(
            "Dispatching {:?} to {} (opaque={}, partition={}, retries={})",
            opcode,
            endpoint,
            opaque,
            partition,
            ctx.retry_attempts()
        );

        let reply =
            match tokio::time::timeout(remaining, self.transport.dispatch(frame, &endpoint)).await {
                Err(_) => return Attempt::TimedOut { in_flight: true },
                Ok(Err(e)) => {
                    tracing::debug!("Dispatch of {:?} to {} failed: {}", opcode, endpoint, e);
                    return Attempt::Failed {
                        kind: dispatch_error_kind(&e, retry),
                        reason: e.retry_reason(),
                        response: None,
                    };
                }
                Ok(Ok(reply)) => reply,
            };

        if reply.body_len() > self.config.max_body_size {
            tracing::warn!(
                "Response from {} exceeds body limit: {} > {}",
                endpoint,
                reply.body_len(),
                self.config.max_body_size
            );
            ctx.fail(ErrorKind::ProtocolError);
            return Attempt::Completed(None);
        }

        if reply.opaque != opaque || reply.opcode != opcode {
            tracing::warn!(
                "Response from {} does not match request: expected {:?}/{}, got {:?}/{}",
                endpoint,
                opcode,
                opaque,
                reply.opcode,
                reply.opaque
            );
            ctx.fail(ErrorKind::ProtocolError);
            return Attempt::Completed(None);
        }

        details.cas = reply.cas;
        details.status = Some(reply.status());

        let info = CmdInfo {
            endpoint: Some(endpoint),
            attempt: ctx.retry_attempts(),
        };
        let response = match ClientResponse::<ResponseOf<Op>>::parse(reply, &info) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Rejected {:?} response: {}", opcode, e);
                ctx.fail(ErrorKind::ProtocolError);
                return Attempt::Completed(None);
            }
        };

        match op.classify(&response) {
            StatusOutcome::Success => {
                ctx.succeed();
                Attempt::Completed(Some(response))
            }
            StatusOutcome::Failure { kind, reason } => Attempt::Failed {
                kind,
                reason,
                response: Some(response),
            },
        }
    }
}

/// Timeout flavour: ambiguous only when a non-idempotent request was in flight
fn timeout_kind(retry: &RetryContext, in_flight: bool) -> ErrorKind {
    if in_flight && !retry.idempotent() {
        ErrorKind::AmbiguousTimeout
    } else {
        ErrorKind::UnambiguousTimeout
    }
}

fn dispatch_error_kind(error: &DispatchError, retry: &RetryContext) -> ErrorKind {
    match error {
        DispatchError::NotConnected => ErrorKind::ServiceNotAvailable,
        DispatchError::ConnectionClosed => ErrorKind::RequestCanceled,
        DispatchError::Timeout => timeout_kind(retry, true),
        DispatchError::Frame(_) => ErrorKind::ProtocolError,
    }
}
