//! Command body contract
//!
//! Every concrete command provides a request body that exposes its wire
//! regions and a response body that interprets a parsed frame.

use super::{ClientOpcode, Header, KeyValueStatus};

/// Dispatch metadata passed to response parsers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmdInfo {
    /// Endpoint the response arrived from
    pub endpoint: Option<String>,

    /// Zero-based attempt number of the logical operation
    pub attempt: u32,
}

/// Request side of a command
///
/// Regions default to empty, so a command without key, extras or value only
/// names its opcode and response type.
pub trait RequestBody {
    const OPCODE: ClientOpcode;

    /// Response body produced by this command
    type Response: ResponseBody;

    fn key(&self) -> &[u8] {
        &[]
    }

    fn framing_extras(&self) -> &[u8] {
        &[]
    }

    fn extras(&self) -> &[u8] {
        &[]
    }

    fn value(&self) -> &[u8] {
        &[]
    }

    /// Encoded body size in bytes
    fn size(&self) -> usize {
        self.framing_extras().len() + self.extras().len() + self.key().len() + self.value().len()
    }
}

/// Response side of a command
pub trait ResponseBody: Default {
    const OPCODE: ClientOpcode;

    /// Populate the body from a response
    ///
    /// `body` holds framing extras, extras, key and value in wire order.
    /// Returns `false` when the response cannot be interpreted for this
    /// opcode; the caller surfaces that as a protocol error.
    fn parse(
        &mut self,
        status: KeyValueStatus,
        header: &Header,
        framing_extras_size: u8,
        key_size: u16,
        extras_size: u8,
        body: &[u8],
        info: &CmdInfo,
    ) -> bool;
}

/// Borrowed view of the four body regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyRegions<'a> {
    pub framing_extras: &'a [u8],
    pub extras: &'a [u8],
    pub key: &'a [u8],
    pub value: &'a [u8],
}

/// Split a body into its regions
///
/// Returns `None` when the declared sizes do not fit in `body`.
pub fn split_body(
    body: &[u8],
    framing_extras_size: u8,
    key_size: u16,
    extras_size: u8,
) -> Option<BodyRegions<'_>> {
    let fe_end = framing_extras_size as usize;
    let extras_end = fe_end + extras_size as usize;
    let key_end = extras_end + key_size as usize;
    if key_end > body.len() {
        return None;
    }

    Some(BodyRegions {
        framing_extras: &body[..fe_end],
        extras: &body[fe_end..extras_end],
        key: &body[extras_end..key_end],
        value: &body[key_end..],
    })
}
