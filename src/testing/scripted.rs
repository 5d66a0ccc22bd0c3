//! Scripted transport
//!
//! Replies are consumed in order, one per dispatch. Every dispatched frame
//! is recorded with its destination.

use std::collections::VecDeque;
use std::fmt;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::DispatchError;
use crate::operations::Transport;
use crate::protocol::{Frame, KeyValueStatus};
use super::helpers::respond_to;

/// Builds a reply from the dispatched request
pub type ReplyFn = Box<dyn Fn(&Frame) -> Frame + Send + Sync>;

pub enum ScriptedReply {
    /// Correlated reply with an empty body
    Status(KeyValueStatus),

    /// Correlated reply with the given regions
    Respond {
        status: KeyValueStatus,
        extras: Vec<u8>,
        key: Vec<u8>,
        value: Vec<u8>,
    },

    /// Arbitrary reply, e.g. a mis-correlated one
    Custom(ReplyFn),

    Fail(DispatchError),

    /// Never answer
    Hang,
}

impl fmt::Debug for ScriptedReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => f.debug_tuple("Status").field(status).finish(),
            Self::Respond { status, .. } => f.debug_struct("Respond").field("status", status).finish(),
            Self::Custom(_) => f.write_str("Custom"),
            Self::Fail(e) => f.debug_tuple("Fail").field(e).finish(),
            Self::Hang => f.write_str("Hang"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ScriptedReply>>,
    dispatched: Mutex<Vec<(String, Frame)>>,
    local_address: Option<String>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            dispatched: Mutex::new(Vec::new()),
            local_address: None,
        }
    }

    pub fn with_local_address(mut self, address: impl Into<String>) -> Self {
        self.local_address = Some(address.into());
        self
    }

    /// Append a reply to the script
    pub fn push(&self, reply: ScriptedReply) {
        self.replies.lock().push_back(reply);
    }

    /// Destinations and frames dispatched so far
    pub fn dispatched(&self) -> Vec<(String, Frame)> {
        self.dispatched.lock().clone()
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatched.lock().len()
    }

    /// Replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies.lock().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn dispatch(&self, frame: Frame, destination: &str) -> Result<Frame, DispatchError> {
        self.dispatched
            .lock()
            .push((destination.to_string(), frame.clone()));

        // Guard released before any await below.
        let next = self.replies.lock().pop_front();
        match next {
            None => Err(DispatchError::NotConnected),
            Some(ScriptedReply::Status(status)) => Ok(respond_to(&frame, status, &[], &[], &[])),
            Some(ScriptedReply::Respond {
                status,
                extras,
                key,
                value,
            }) => Ok(respond_to(&frame, status, &extras, &key, &value)),
            Some(ScriptedReply::Custom(build)) => Ok(build(&frame)),
            Some(ScriptedReply::Fail(e)) => Err(e),
            Some(ScriptedReply::Hang) => std::future::pending().await,
        }
    }

    fn local_address(&self, _destination: &str) -> Option<String> {
        self.local_address.clone()
    }
}
