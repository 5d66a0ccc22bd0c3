//! Frame header
//!
//! The fixed 24-byte header that precedes every frame body.

use bytes::{BufMut, BytesMut};

use crate::error::ParseError;
use super::ClientOpcode;

/// Header size in bytes
pub const HEADER_SIZE: usize = 24;

/// Maximum accepted body size (20 MB)
pub const MAX_BODY_SIZE: usize = 20 * 1024 * 1024;

/// First byte of every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Magic {
    /// Request carrying framing extras
    AltRequest = 0x08,
    /// Response carrying framing extras
    AltResponse = 0x18,
    Request = 0x80,
    Response = 0x81,
}

impl Magic {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x08 => Some(Magic::AltRequest),
            0x18 => Some(Magic::AltResponse),
            0x80 => Some(Magic::Request),
            0x81 => Some(Magic::Response),
            _ => None,
        }
    }

    /// Whether the header uses the split framing-extras/key length layout
    pub fn is_flexible(self) -> bool {
        matches!(self, Magic::AltRequest | Magic::AltResponse)
    }

    pub fn is_request(self) -> bool {
        matches!(self, Magic::AltRequest | Magic::Request)
    }

    pub fn is_response(self) -> bool {
        !self.is_request()
    }
}

/// Decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: Magic,
    pub opcode: ClientOpcode,
    pub framing_extras_len: u8,
    pub key_len: u16,
    pub extras_len: u8,
    pub datatype: u8,
    /// VBucket for requests, status for responses
    pub vbucket_or_status: u16,
    pub total_body_len: u32,
    pub opaque: u32,
    pub cas: u64,
}

impl Header {
    /// Length of the body that follows the header
    pub fn body_len(&self) -> usize {
        self.total_body_len as usize
    }

    /// Header plus body
    pub fn frame_len(&self) -> usize {
        HEADER_SIZE + self.body_len()
    }

    /// Length of the value region implied by the other length fields
    ///
    /// Zero when the region lengths overrun the body; `parse` rejects such
    /// headers but a hand-built one may still carry them.
    pub fn value_len(&self) -> usize {
        let regions =
            self.framing_extras_len as usize + self.extras_len as usize + self.key_len as usize;
        self.body_len().saturating_sub(regions)
    }

    /// Append the 24 header bytes to `buf`
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.magic as u8);
        buf.put_u8(self.opcode as u8);
        if self.magic.is_flexible() {
            buf.put_u8(self.framing_extras_len);
            buf.put_u8(self.key_len as u8);
        } else {
            buf.put_u16(self.key_len);
        }
        buf.put_u8(self.extras_len);
        buf.put_u8(self.datatype);
        buf.put_u16(self.vbucket_or_status);
        buf.put_u32(self.total_body_len);
        buf.put_u32(self.opaque);
        buf.put_u64(self.cas);
    }

    /// Parse and validate a header
    ///
    /// Only the first `HEADER_SIZE` bytes are read. The body itself is not
    /// required to be present.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.len() < HEADER_SIZE {
            return Err(ParseError::Truncated {
                needed: HEADER_SIZE,
                available: bytes.len(),
            });
        }

        let magic = Magic::from_byte(bytes[0])
            .ok_or_else(|| ParseError::Malformed(format!("unknown magic 0x{:02x}", bytes[0])))?;
        let opcode = ClientOpcode::try_from(bytes[1])?;

        let (framing_extras_len, key_len) = if magic.is_flexible() {
            (bytes[2], bytes[3] as u16)
        } else {
            (0, u16::from_be_bytes([bytes[2], bytes[3]]))
        };

        let header = Header {
            magic,
            opcode,
            framing_extras_len,
            key_len,
            extras_len: bytes[4],
            datatype: bytes[5],
            vbucket_or_status: u16::from_be_bytes([bytes[6], bytes[7]]),
            total_body_len: u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            opaque: u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            cas: u64::from_be_bytes([
                bytes[16], bytes[17], bytes[18], bytes[19],
                bytes[20], bytes[21], bytes[22], bytes[23],
            ]),
        };

        let regions = header.framing_extras_len as usize
            + header.extras_len as usize
            + header.key_len as usize;
        if regions > header.body_len() {
            return Err(ParseError::Malformed(format!(
                "framing extras ({}) + extras ({}) + key ({}) exceed body length {}",
                header.framing_extras_len,
                header.extras_len,
                header.key_len,
                header.total_body_len
            )));
        }

        Ok(header)
    }

    /// Parse a header and reject bodies larger than `max_body`
    pub fn parse_bounded(bytes: &[u8], max_body: usize) -> Result<Self, ParseError> {
        let header = Self::parse(bytes)?;
        if header.body_len() > max_body {
            return Err(ParseError::Malformed(format!(
                "body too large: {} bytes (max {})",
                header.total_body_len, max_body
            )));
        }
        Ok(header)
    }
}
