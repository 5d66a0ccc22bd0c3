//! Liveness check

use std::time::Duration;

use crate::context::KeyValueErrorContext;
use crate::error::Result;
use crate::protocol::commands::{NoopRequestBody, NoopResponseBody};
use crate::protocol::{ClientRequest, ClientResponse};
use crate::retry::{RetryContext, RetryStrategy};
use super::executor::KeyValueOperation;

#[derive(Debug, Clone, Default)]
pub struct NoopRequest {
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct NoopResponse {
    pub ctx: KeyValueErrorContext,
    /// Server processing time, when reported
    pub server_duration: Option<Duration>,
}

impl KeyValueOperation for NoopRequest {
    type Body = NoopRequestBody;
    type Response = NoopResponse;

    fn encode(&self, opaque: u32) -> Result<ClientRequest<NoopRequestBody>> {
        Ok(ClientRequest::new(NoopRequestBody).with_opaque(opaque))
    }

    fn retry_context(&self, default: RetryStrategy) -> RetryContext {
        RetryContext::new(default, true)
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn make_response(
        &self,
        ctx: KeyValueErrorContext,
        response: Option<ClientResponse<NoopResponseBody>>,
    ) -> NoopResponse {
        NoopResponse {
            server_duration: response.and_then(|r| r.server_duration()),
            ctx,
        }
    }
}
