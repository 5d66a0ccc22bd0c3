//! Document fetch

use std::time::Duration;

use bytes::Bytes;

use crate::context::KeyValueErrorContext;
use crate::document_id::DocumentId;
use crate::error::Result;
use crate::protocol::commands::{GetRequestBody, GetResponseBody};
use crate::protocol::{ClientRequest, ClientResponse};
use crate::retry::{RetryContext, RetryStrategy};
use super::executor::KeyValueOperation;

#[derive(Debug, Clone)]
pub struct GetRequest {
    pub id: DocumentId,
    pub partition: u16,
    pub timeout: Option<Duration>,
    pub retry_strategy: Option<RetryStrategy>,
}

impl GetRequest {
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
pub struct GetResponse {
    pub ctx: KeyValueErrorContext,
    pub cas: u64,
    pub flags: u32,
    pub value: Bytes,
}

impl KeyValueOperation for GetRequest {
    type Body = GetRequestBody;
    type Response = GetResponse;

    fn encode(&self, opaque: u32) -> Result<ClientRequest<GetRequestBody>> {
        Ok(ClientRequest::new(GetRequestBody::new(self.id.key()))
            .with_opaque(opaque)
            .with_partition(self.partition))
    }

    fn partition(&self) -> u16 {
        self.partition
    }

    fn retry_context(&self, default: RetryStrategy) -> RetryContext {
        RetryContext::new(self.retry_strategy.unwrap_or(default), true)
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn document_id(&self) -> Option<&DocumentId> {
        Some(&self.id)
    }

    fn make_response(
        &self,
        ctx: KeyValueErrorContext,
        response: Option<ClientResponse<GetResponseBody>>,
    ) -> GetResponse {
        match response.filter(|_| ctx.is_success()) {
            Some(response) => GetResponse {
                cas: response.cas(),
                flags: response.body().flags(),
                value: response.body().value().clone(),
                ctx,
            },
            None => GetResponse {
                ctx,
                cas: 0,
                flags: 0,
                value: Bytes::new(),
            },
        }
    }
}
