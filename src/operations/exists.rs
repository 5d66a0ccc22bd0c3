//! Document existence query

use std::time::Duration;

use crate::context::{KeyValueErrorContext, RetryReason};
use crate::document_id::DocumentId;
use crate::error::{ErrorKind, Result};
use crate::protocol::commands::{ExistsRequestBody, ExistsResponseBody, ObserveStatus};
use crate::protocol::{ClientRequest, ClientResponse, StatusOutcome};
use crate::retry::{RetryContext, RetryStrategy};
use super::executor::KeyValueOperation;

/// Ask whether a document exists, and how durable it is
#[derive(Debug, Clone)]
pub struct ExistsRequest {
    pub id: DocumentId,
    pub partition: u16,
    pub timeout: Option<Duration>,
    /// Overrides the executor's default strategy; never idempotent
    pub retry_strategy: Option<RetryStrategy>,
}

impl ExistsRequest {
    pub fn new(id: DocumentId, partition: u16) -> Self {
        Self {
            id,
            partition,
            timeout: None,
            retry_strategy: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = Some(strategy);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ExistsResponse {
    pub ctx: KeyValueErrorContext,
    pub partition_id: u16,
    pub cas: u64,
    pub status: ObserveStatus,
}

impl ExistsResponse {
    pub fn exists(&self) -> bool {
        self.status.exists()
    }
}

impl KeyValueOperation for ExistsRequest {
    type Body = ExistsRequestBody;
    type Response = ExistsResponse;

    fn encode(&self, opaque: u32) -> Result<ClientRequest<ExistsRequestBody>> {
        let body = ExistsRequestBody::new(self.partition, self.id.key().as_bytes())?;
        Ok(ClientRequest::new(body)
            .with_opaque(opaque)
            .with_partition(self.partition))
    }

    fn partition(&self) -> u16 {
        self.partition
    }

    fn retry_context(&self, default: RetryStrategy) -> RetryContext {
        RetryContext::new(self.retry_strategy.unwrap_or(default), false)
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn document_id(&self) -> Option<&DocumentId> {
        Some(&self.id)
    }

    fn classify(&self, response: &ClientResponse<ExistsResponseBody>) -> StatusOutcome {
        let status = response.status();
        let body = response.body();

        match ObserveStatus::derive(status, body.observe_status()) {
            ObserveStatus::Invalid => match status.outcome() {
                // Success status with an unknown observe byte.
                StatusOutcome::Success => StatusOutcome::Failure {
                    kind: ErrorKind::ProtocolError,
                    reason: RetryReason::DoNotRetry,
                },
                failure => failure,
            },
            _ if status.is_success() && body.key() != self.id.key().as_bytes() => {
                tracing::warn!(
                    "Observe reply for {} names a different key ({} bytes)",
                    self.id,
                    body.key().len()
                );
                StatusOutcome::Failure {
                    kind: ErrorKind::ProtocolError,
                    reason: RetryReason::DoNotRetry,
                }
            }
            _ => StatusOutcome::Success,
        }
    }

    fn make_response(
        &self,
        ctx: KeyValueErrorContext,
        response: Option<ClientResponse<ExistsResponseBody>>,
    ) -> ExistsResponse {
        let mut result = ExistsResponse {
            partition_id: self.partition,
            cas: 0,
            status: ObserveStatus::Invalid,
            ctx,
        };
        if !result.ctx.is_success() {
            return result;
        }

        if let Some(response) = response {
            let body = response.body();
            result.status = ObserveStatus::derive(response.status(), body.observe_status());
            if response.status().is_success() {
                result.partition_id = body.partition_id();
                result.cas = body.cas();
            }
        }
        result
    }
}
