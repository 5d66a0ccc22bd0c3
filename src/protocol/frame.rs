//! Wire frame
//!
//! Encoding and decoding of complete frames: header followed by framing
//! extras, extras, key and value, in that order.

use std::io::{Read, Write};
use std::time::Duration;

use bytes::{Bytes, BytesMut};

use crate::error::{McbpError, ParseError, Result};
use super::header::{Header, Magic, HEADER_SIZE, MAX_BODY_SIZE};
use super::{ClientOpcode, KeyValueStatus};

/// Frame info id for the server recv->send duration
const FRAME_INFO_SERVER_DURATION: usize = 0;

/// One complete protocol message
///
/// Regions of a parsed frame share a single allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub magic: Magic,
    pub opcode: ClientOpcode,
    pub datatype: u8,
    /// VBucket for requests, status for responses
    pub vbucket_or_status: u16,
    pub opaque: u32,
    pub cas: u64,
    pub framing_extras: Bytes,
    pub extras: Bytes,
    pub key: Bytes,
    pub value: Bytes,
}

impl Frame {
    /// Create an empty frame for the given magic and opcode
    pub fn new(magic: Magic, opcode: ClientOpcode) -> Self {
        Self {
            magic,
            opcode,
            datatype: 0,
            vbucket_or_status: 0,
            opaque: 0,
            cas: 0,
            framing_extras: Bytes::new(),
            extras: Bytes::new(),
            key: Bytes::new(),
            value: Bytes::new(),
        }
    }

    /// Total body length: framing extras + extras + key + value
    pub fn body_len(&self) -> usize {
        self.framing_extras.len() + self.extras.len() + self.key.len() + self.value.len()
    }

    /// Size of the encoded frame
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.body_len()
    }

    /// Response status (meaningful only for response frames)
    pub fn status(&self) -> KeyValueStatus {
        KeyValueStatus::from_code(self.vbucket_or_status)
    }

    /// Body regions concatenated in wire order
    pub fn body(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.body_len());
        buf.extend_from_slice(&self.framing_extras);
        buf.extend_from_slice(&self.extras);
        buf.extend_from_slice(&self.key);
        buf.extend_from_slice(&self.value);
        buf.freeze()
    }

    /// Build the header with every length field taken from its region
    pub fn header(&self) -> Result<Header> {
        if !self.framing_extras.is_empty() && !self.magic.is_flexible() {
            return Err(McbpError::InvalidArgument(format!(
                "framing extras require flexible magic, got {:?}",
                self.magic
            )));
        }

        let max_key = if self.magic.is_flexible() {
            u8::MAX as usize
        } else {
            u16::MAX as usize
        };
        if self.key.len() > max_key {
            return Err(McbpError::InvalidArgument(format!(
                "key too long: {} bytes (max {})",
                self.key.len(),
                max_key
            )));
        }
        if self.extras.len() > u8::MAX as usize {
            return Err(McbpError::InvalidArgument(format!(
                "extras too long: {} bytes",
                self.extras.len()
            )));
        }
        if self.framing_extras.len() > u8::MAX as usize {
            return Err(McbpError::InvalidArgument(format!(
                "framing extras too long: {} bytes",
                self.framing_extras.len()
            )));
        }
        let total = u32::try_from(self.body_len()).map_err(|_| {
            McbpError::InvalidArgument(format!("body too long: {} bytes", self.body_len()))
        })?;

        Ok(Header {
            magic: self.magic,
            opcode: self.opcode,
            framing_extras_len: self.framing_extras.len() as u8,
            key_len: self.key.len() as u16,
            extras_len: self.extras.len() as u8,
            datatype: self.datatype,
            vbucket_or_status: self.vbucket_or_status,
            total_body_len: total,
            opaque: self.opaque,
            cas: self.cas,
        })
    }

    /// Encode the frame to bytes
    pub fn encode(&self) -> Result<Bytes> {
        let header = self.header()?;

        let mut buf = BytesMut::with_capacity(self.encoded_len());
        header.encode(&mut buf);
        buf.extend_from_slice(&self.framing_extras);
        buf.extend_from_slice(&self.extras);
        buf.extend_from_slice(&self.key);
        buf.extend_from_slice(&self.value);

        tracing::trace!(
            "Encoded {:?} frame: opaque={} body={} bytes",
            self.opcode,
            self.opaque,
            header.total_body_len
        );
        Ok(buf.freeze())
    }

    /// Parse exactly one frame from `bytes`
    ///
    /// The buffer must hold the whole frame and nothing else.
    pub fn parse(bytes: &[u8]) -> std::result::Result<Frame, ParseError> {
        Self::parse_bounded(bytes, MAX_BODY_SIZE)
    }

    /// Parse exactly one frame, rejecting bodies larger than `max_body`
    pub fn parse_bounded(bytes: &[u8], max_body: usize) -> std::result::Result<Frame, ParseError> {
        let header = Header::parse_bounded(bytes, max_body)?;

        let total = header.frame_len();
        if bytes.len() < total {
            return Err(ParseError::Truncated {
                needed: total,
                available: bytes.len(),
            });
        }
        if bytes.len() > total {
            return Err(ParseError::Malformed(format!(
                "{} trailing bytes after frame",
                bytes.len() - total
            )));
        }

        let body = Bytes::copy_from_slice(&bytes[HEADER_SIZE..total]);
        Ok(Self::from_parts(&header, body))
    }

    /// Split a complete body into regions according to `header`
    ///
    /// The header must already have been validated against the body length.
    fn from_parts(header: &Header, mut body: Bytes) -> Frame {
        let framing_extras = body.split_to(header.framing_extras_len as usize);
        let extras = body.split_to(header.extras_len as usize);
        let key = body.split_to(header.key_len as usize);

        Frame {
            magic: header.magic,
            opcode: header.opcode,
            datatype: header.datatype,
            vbucket_or_status: header.vbucket_or_status,
            opaque: header.opaque,
            cas: header.cas,
            framing_extras,
            extras,
            key,
            value: body,
        }
    }

    /// Server-side processing time reported in the framing extras
    pub fn server_duration(&self) -> Option<Duration> {
        let mut pos = 0;
        let fe = &self.framing_extras;

        while pos < fe.len() {
            let control = fe[pos];
            pos += 1;

            let mut id = (control >> 4) as usize;
            let mut len = (control & 0x0f) as usize;
            if id == 0x0f {
                id += *fe.get(pos)? as usize;
                pos += 1;
            }
            if len == 0x0f {
                len += *fe.get(pos)? as usize;
                pos += 1;
            }
            let data = fe.get(pos..pos + len)?;
            pos += len;

            if id == FRAME_INFO_SERVER_DURATION && len == 2 {
                let encoded = u16::from_be_bytes([data[0], data[1]]) as f64;
                let micros = encoded.powf(1.74) / 2.0;
                return Some(Duration::from_micros(micros.round() as u64));
            }
        }

        None
    }
}

// =============================================================================
// Streaming helpers
// =============================================================================

/// Take one complete frame off the front of `buf`
///
/// Returns `Ok(None)` until enough bytes are buffered. On success exactly one
/// frame is consumed; bytes of the next frame stay in `buf`.
pub fn decode_frame(buf: &mut BytesMut, max_body: usize) -> std::result::Result<Option<Frame>, ParseError> {
    if buf.len() < HEADER_SIZE {
        return Ok(None);
    }

    let header = Header::parse_bounded(&buf[..], max_body)?;
    let total = header.frame_len();
    if buf.len() < total {
        buf.reserve(total - buf.len());
        return Ok(None);
    }

    let mut frame_bytes = buf.split_to(total).freeze();
    let body = frame_bytes.split_off(HEADER_SIZE);
    Ok(Some(Frame::from_parts(&header, body)))
}

/// Read a complete frame from a stream
///
/// Blocks until a complete frame is received or an error occurs
pub fn read_frame<R: Read>(reader: &mut R, max_body: usize) -> Result<Frame> {
    let mut header_bytes = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header_bytes)?;

    let header = Header::parse_bounded(&header_bytes, max_body)?;

    let mut body = vec![0u8; header.body_len()];
    if !body.is_empty() {
        reader.read_exact(&mut body)?;
    }

    Ok(Frame::from_parts(&header, Bytes::from(body)))
}

/// Write a frame to a stream
pub fn write_frame<W: Write>(writer: &mut W, frame: &Frame) -> Result<()> {
    let bytes = frame.encode()?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
