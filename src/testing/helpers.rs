//! Frame builders for tests

use bytes::Bytes;

use crate::protocol::{Frame, KeyValueStatus, Magic};

/// Build the response a server would send for `request`
///
/// Opcode and opaque are echoed so the reply correlates.
pub fn respond_to(
    request: &Frame,
    status: KeyValueStatus,
    extras: &[u8],
    key: &[u8],
    value: &[u8],
) -> Frame {
    let mut reply = Frame::new(Magic::Response, request.opcode);
    reply.opaque = request.opaque;
    reply.vbucket_or_status = status.code();
    reply.extras = Bytes::copy_from_slice(extras);
    reply.key = Bytes::copy_from_slice(key);
    reply.value = Bytes::copy_from_slice(value);
    reply
}

/// Observe response value for one key
pub fn observe_value(partition: u16, key: &[u8], observe_byte: u8, cas: u64) -> Vec<u8> {
    let mut value = Vec::with_capacity(4 + key.len() + 9);
    value.extend_from_slice(&partition.to_be_bytes());
    value.extend_from_slice(&(key.len() as u16).to_be_bytes());
    value.extend_from_slice(key);
    value.push(observe_byte);
    value.extend_from_slice(&cas.to_be_bytes());
    value
}
