//! Document existence via observe
//!
//! ## Request value
//! ```text
//! ┌───────────────┬─────────────┬─────────────┐
//! │ Partition (2) │ Key Len (2) │     Key     │
//! └───────────────┴─────────────┴─────────────┘
//! ```
//!
//! ## Response value (success)
//! ```text
//! ┌───────────────┬─────────────┬───────┬───────────────┬─────────┐
//! │ Partition (2) │ Key Len (2) │  Key  │ Observe St (1)│ CAS (8) │
//! └───────────────┴─────────────┴───────┴───────────────┴─────────┘
//! ```
//!
//! ## Observe status byte
//! - 0x00: found, not persisted
//! - 0x01: found, persisted
//! - 0x80: not found
//! - 0x81: logically deleted

use serde::Serialize;

use crate::error::{McbpError, Result};
use crate::protocol::{split_body, ClientOpcode, CmdInfo, Header, KeyValueStatus, RequestBody, ResponseBody};

const OBSERVE_FOUND: u8 = 0x00;
const OBSERVE_PERSISTED: u8 = 0x01;
const OBSERVE_NOT_FOUND: u8 = 0x80;
const OBSERVE_LOGICALLY_DELETED: u8 = 0x81;

/// Durability-qualified existence of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserveStatus {
    #[default]
    Invalid,
    Found,
    NotFound,
    Persisted,
    LogicallyDeleted,
}

impl ObserveStatus {
    /// Derive the state from a response status and its observe byte
    ///
    /// Any combination not listed in the module docs yields `Invalid`, which
    /// callers must treat as a protocol error rather than as absence.
    pub fn derive(status: KeyValueStatus, observe_byte: Option<u8>) -> Self {
        match (status, observe_byte) {
            (KeyValueStatus::Success, Some(OBSERVE_FOUND)) => ObserveStatus::Found,
            (KeyValueStatus::Success, Some(OBSERVE_PERSISTED)) => ObserveStatus::Persisted,
            (KeyValueStatus::Success, Some(OBSERVE_NOT_FOUND)) => ObserveStatus::NotFound,
            (KeyValueStatus::Success, Some(OBSERVE_LOGICALLY_DELETED)) => {
                ObserveStatus::LogicallyDeleted
            }
            (KeyValueStatus::NotFound, _) => ObserveStatus::NotFound,
            _ => ObserveStatus::Invalid,
        }
    }

    /// True when the document is live (in memory or on disk)
    pub fn exists(self) -> bool {
        matches!(self, ObserveStatus::Found | ObserveStatus::Persisted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistsRequestBody {
    value: Vec<u8>,
}

impl ExistsRequestBody {
    pub fn new(partition: u16, key: &[u8]) -> Result<Self> {
        let key_len = u16::try_from(key.len()).map_err(|_| {
            McbpError::InvalidArgument(format!("key too long: {} bytes", key.len()))
        })?;

        let mut value = Vec::with_capacity(4 + key.len());
        value.extend_from_slice(&partition.to_be_bytes());
        value.extend_from_slice(&key_len.to_be_bytes());
        value.extend_from_slice(key);
        Ok(Self { value })
    }
}

impl RequestBody for ExistsRequestBody {
    const OPCODE: ClientOpcode = ClientOpcode::Observe;
    type Response = ExistsResponseBody;

    fn value(&self) -> &[u8] {
        &self.value
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistsResponseBody {
    partition_id: u16,
    key: Vec<u8>,
    observe_status: Option<u8>,
    cas: u64,
}

impl ExistsResponseBody {
    pub fn partition_id(&self) -> u16 {
        self.partition_id
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Raw observe byte; `None` when the server sent no observe entry
    pub fn observe_status(&self) -> Option<u8> {
        self.observe_status
    }

    pub fn cas(&self) -> u64 {
        self.cas
    }
}

impl ResponseBody for ExistsResponseBody {
    const OPCODE: ClientOpcode = ClientOpcode::Observe;

    fn parse(
        &mut self,
        status: KeyValueStatus,
        _header: &Header,
        framing_extras_size: u8,
        key_size: u16,
        extras_size: u8,
        body: &[u8],
        _info: &CmdInfo,
    ) -> bool {
        let Some(regions) = split_body(body, framing_extras_size, key_size, extras_size) else {
            return false;
        };
        if !status.is_success() {
            return true;
        }

        let value = regions.value;
        if value.len() < 4 {
            return false;
        }
        let partition_id = u16::from_be_bytes([value[0], value[1]]);
        let key_len = u16::from_be_bytes([value[2], value[3]]) as usize;
        if value.len() != 4 + key_len + 1 + 8 {
            return false;
        }

        let key_end = 4 + key_len;
        let mut cas = [0u8; 8];
        cas.copy_from_slice(&value[key_end + 1..]);

        self.partition_id = partition_id;
        self.key = value[4..key_end].to_vec();
        self.observe_status = Some(value[key_end]);
        self.cas = u64::from_be_bytes(cas);
        true
    }
}
