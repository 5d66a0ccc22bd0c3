//! Transport boundary
//!
//! The executor consumes these traits; socket IO, pooling and topology live
//! behind them.

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::protocol::Frame;

/// Sends one encoded request and yields its response frame
#[async_trait]
pub trait Transport: Send + Sync {
    async fn dispatch(&self, frame: Frame, destination: &str) -> Result<Frame, DispatchError>;

    /// Local address used when talking to `destination`, if known
    fn local_address(&self, _destination: &str) -> Option<String> {
        None
    }
}

/// Maps a partition to the endpoint that owns it
pub trait Router: Send + Sync {
    fn route(&self, partition: u16) -> Option<String>;
}

/// Routes every partition to one endpoint
#[derive(Debug, Clone)]
pub struct StaticRouter {
    endpoint: String,
}

impl StaticRouter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Router for StaticRouter {
    fn route(&self, _partition: u16) -> Option<String> {
        Some(self.endpoint.clone())
    }
}
