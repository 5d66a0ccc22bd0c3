//! Document fetch

use bytes::Bytes;

use crate::protocol::{split_body, ClientOpcode, CmdInfo, Header, KeyValueStatus, RequestBody, ResponseBody};

/// Size of the flags extras in a successful reply
const FLAGS_SIZE: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRequestBody {
    key: Vec<u8>,
}

impl GetRequestBody {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }
}

impl RequestBody for GetRequestBody {
    const OPCODE: ClientOpcode = ClientOpcode::Get;
    type Response = GetResponseBody;

    fn key(&self) -> &[u8] {
        &self.key
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetResponseBody {
    flags: u32,
    value: Bytes,
}

impl GetResponseBody {
    /// Client-defined document flags
    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }
}

impl ResponseBody for GetResponseBody {
    const OPCODE: ClientOpcode = ClientOpcode::Get;

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
        if extras_size != FLAGS_SIZE {
            return false;
        }

        let extras = regions.extras;
        self.flags = u32::from_be_bytes([extras[0], extras[1], extras[2], extras[3]]);
        self.value = Bytes::copy_from_slice(regions.value);
        true
    }
}
