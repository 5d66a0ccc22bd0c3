//! Typed request frames

use bytes::Bytes;

use crate::error::Result;
use super::{Frame, Magic, RequestBody};

/// A request body plus the header fields the caller controls
#[derive(Debug, Clone)]
pub struct ClientRequest<B: RequestBody> {
    pub opaque: u32,
    pub partition: u16,
    pub cas: u64,
    pub datatype: u8,
    body: B,
}

impl<B: RequestBody> ClientRequest<B> {
    pub fn new(body: B) -> Self {
        Self {
            opaque: 0,
            partition: 0,
            cas: 0,
            datatype: 0,
            body,
        }
    }

    pub fn with_opaque(mut self, opaque: u32) -> Self {
        self.opaque = opaque;
        self
    }

    pub fn with_partition(mut self, partition: u16) -> Self {
        self.partition = partition;
        self
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    /// Build the wire frame
    ///
    /// Flexible magic is selected whenever the body has framing extras.
    pub fn frame(&self) -> Frame {
        let magic = if self.body.framing_extras().is_empty() {
            Magic::Request
        } else {
            Magic::AltRequest
        };

        Frame {
            magic,
            opcode: B::OPCODE,
            datatype: self.datatype,
            vbucket_or_status: self.partition,
            opaque: self.opaque,
            cas: self.cas,
            framing_extras: Bytes::copy_from_slice(self.body.framing_extras()),
            extras: Bytes::copy_from_slice(self.body.extras()),
            key: Bytes::copy_from_slice(self.body.key()),
            value: Bytes::copy_from_slice(self.body.value()),
        }
    }

    /// Encode to bytes
    pub fn encode(&self) -> Result<Bytes> {
        self.frame().encode()
    }
}
