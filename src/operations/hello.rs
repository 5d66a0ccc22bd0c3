//! Feature negotiation

use std::time::Duration;

use crate::config::Config;
use crate::context::KeyValueErrorContext;
use crate::error::Result;
use crate::protocol::commands::{HelloFeature, HelloRequestBody, HelloResponseBody};
use crate::protocol::{ClientRequest, ClientResponse};
use crate::retry::{RetryContext, RetryStrategy};
use super::executor::KeyValueOperation;

#[derive(Debug, Clone)]
pub struct HelloRequest {
    pub user_agent: String,
    pub features: Vec<HelloFeature>,
    pub timeout: Option<Duration>,
}

impl HelloRequest {
    pub fn new(user_agent: impl Into<String>, features: Vec<HelloFeature>) -> Self {
        Self {
            user_agent: user_agent.into(),
            features,
            timeout: None,
        }
    }

    /// Announce the configured user agent
    pub fn from_config(config: &Config, features: Vec<HelloFeature>) -> Self {
        Self::new(config.user_agent.clone(), features)
    }
}

#[derive(Debug, Clone)]
pub struct HelloResponse {
    pub ctx: KeyValueErrorContext,
    /// Raw codes the server enabled
    pub feature_codes: Vec<u16>,
}

impl HelloResponse {
    pub fn supports(&self, feature: HelloFeature) -> bool {
        self.feature_codes.contains(&(feature as u16))
    }

    pub fn supported_features(&self) -> Vec<HelloFeature> {
        self.feature_codes
            .iter()
            .copied()
            .filter_map(HelloFeature::from_code)
            .collect()
    }
}

impl KeyValueOperation for HelloRequest {
    type Body = HelloRequestBody;
    type Response = HelloResponse;

    fn encode(&self, opaque: u32) -> Result<ClientRequest<HelloRequestBody>> {
        let body = HelloRequestBody::new(&self.user_agent, &self.features)?;
        Ok(ClientRequest::new(body).with_opaque(opaque))
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
        response: Option<ClientResponse<HelloResponseBody>>,
    ) -> HelloResponse {
        let feature_codes = response
            .filter(|_| ctx.is_success())
            .map(|r| r.body().feature_codes().to_vec())
            .unwrap_or_default();
        HelloResponse { ctx, feature_codes }
    }
}
