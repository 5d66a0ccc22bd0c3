//! Typed response frames

use std::time::Duration;

use crate::error::{McbpError, Result};
use super::{CmdInfo, Frame, Header, KeyValueStatus, ResponseBody};

/// A parsed response frame with its typed body
#[derive(Debug, Clone)]
pub struct ClientResponse<B: ResponseBody> {
    header: Header,
    frame: Frame,
    body: B,
}

impl<B: ResponseBody> ClientResponse<B> {
    /// Interpret a frame as a response for `B`
    ///
    /// Fails with `McbpError::Protocol` when the frame is not a response, has
    /// a different opcode, or the body parser rejects it.
    pub fn parse(frame: Frame, info: &CmdInfo) -> Result<Self> {
        if !frame.magic.is_response() {
            return Err(McbpError::Protocol(format!(
                "expected response magic, got {:?}",
                frame.magic
            )));
        }
        if frame.opcode != B::OPCODE {
            return Err(McbpError::Protocol(format!(
                "expected {:?} response, got {:?}",
                B::OPCODE,
                frame.opcode
            )));
        }

        let header = frame.header()?;
        let body_bytes = frame.body();
        let mut body = B::default();
        let parsed = body.parse(
            frame.status(),
            &header,
            header.framing_extras_len,
            header.key_len,
            header.extras_len,
            &body_bytes,
            info,
        );
        if !parsed {
            tracing::warn!(
                "Unable to interpret {:?} response with status {:?} (opaque={})",
                B::OPCODE,
                frame.status(),
                frame.opaque
            );
            return Err(McbpError::Protocol(format!(
                "{:?} response body is not valid for status {:?}",
                B::OPCODE,
                frame.status()
            )));
        }

        Ok(Self { header, frame, body })
    }

    pub fn status(&self) -> KeyValueStatus {
        self.frame.status()
    }

    pub fn opaque(&self) -> u32 {
        self.header.opaque
    }

    pub fn cas(&self) -> u64 {
        self.header.cas
    }

    pub fn datatype(&self) -> u8 {
        self.header.datatype
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Server processing time, when the server reported it
    pub fn server_duration(&self) -> Option<Duration> {
        self.frame.server_duration()
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn into_body(self) -> B {
        self.body
    }
}
