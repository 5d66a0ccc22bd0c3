//! SASL mechanism listing

use std::time::Duration;

use crate::context::KeyValueErrorContext;
use crate::error::{ErrorKind, Result};
use crate::protocol::commands::{SaslListMechsRequestBody, SaslListMechsResponseBody};
use crate::protocol::{ClientRequest, ClientResponse};
use crate::retry::{RetryContext, RetryStrategy};
use super::executor::KeyValueOperation;

#[derive(Debug, Clone, Default)]
pub struct SaslListMechsRequest {
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct SaslListMechsResponse {
    pub ctx: KeyValueErrorContext,
    pub supported_mechs: Vec<String>,
}

impl KeyValueOperation for SaslListMechsRequest {
    type Body = SaslListMechsRequestBody;
    type Response = SaslListMechsResponse;

    fn encode(&self, opaque: u32) -> Result<ClientRequest<SaslListMechsRequestBody>> {
        Ok(ClientRequest::new(SaslListMechsRequestBody).with_opaque(opaque))
    }

    fn retry_context(&self, default: RetryStrategy) -> RetryContext {
        RetryContext::new(default, true)
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// A rejected listing surfaces as an authentication failure
    fn make_response(
        &self,
        ctx: KeyValueErrorContext,
        response: Option<ClientResponse<SaslListMechsResponseBody>>,
    ) -> SaslListMechsResponse {
        let rejected = ctx.outcome() == Err(ErrorKind::ProtocolError)
            && ctx.status().is_some_and(|status| !status.is_success());

        let ctx = if rejected {
            match ctx.clone().recontextualize(ErrorKind::AuthenticationFailure) {
                Ok(ctx) => ctx,
                Err(e) => {
                    tracing::warn!("Keeping original listing failure: {}", e);
                    ctx
                }
            }
        } else {
            ctx
        };

        let supported_mechs = response
            .map(|r| r.body().supported_mechs().to_vec())
            .unwrap_or_default();
        SaslListMechsResponse {
            ctx,
            supported_mechs,
        }
    }
}
