//! Feature negotiation
//!
//! The request key is the client's user agent and the value is a list of
//! requested feature codes (2 bytes each). The server answers with the subset
//! it enabled.

use crate::error::{McbpError, Result};
use crate::protocol::{split_body, ClientOpcode, CmdInfo, Header, KeyValueStatus, RequestBody, ResponseBody};

/// Features a client can ask the server to enable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum HelloFeature {
    Datatype = 0x01,
    Tls = 0x02,
    TcpNodelay = 0x03,
    MutationSeqno = 0x04,
    Xattr = 0x06,
    Xerror = 0x07,
    SelectBucket = 0x08,
    Snappy = 0x0a,
    Json = 0x0b,
    Duplex = 0x0c,
    UnorderedExecution = 0x0e,
    Tracing = 0x0f,
    AltRequestSupport = 0x10,
    SyncReplication = 0x11,
    Collections = 0x12,
    PreserveTtl = 0x14,
    VattrSupport = 0x15,
    CreateAsDeleted = 0x17,
}

impl HelloFeature {
    pub fn from_code(code: u16) -> Option<Self> {
        let feature = match code {
            0x01 => HelloFeature::Datatype,
            0x02 => HelloFeature::Tls,
            0x03 => HelloFeature::TcpNodelay,
            0x04 => HelloFeature::MutationSeqno,
            0x06 => HelloFeature::Xattr,
            0x07 => HelloFeature::Xerror,
            0x08 => HelloFeature::SelectBucket,
            0x0a => HelloFeature::Snappy,
            0x0b => HelloFeature::Json,
            0x0c => HelloFeature::Duplex,
            0x0e => HelloFeature::UnorderedExecution,
            0x0f => HelloFeature::Tracing,
            0x10 => HelloFeature::AltRequestSupport,
            0x11 => HelloFeature::SyncReplication,
            0x12 => HelloFeature::Collections,
            0x14 => HelloFeature::PreserveTtl,
            0x15 => HelloFeature::VattrSupport,
            0x17 => HelloFeature::CreateAsDeleted,
            _ => return None,
        };
        Some(feature)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelloRequestBody {
    user_agent: Vec<u8>,
    value: Vec<u8>,
}

impl HelloRequestBody {
    pub fn new(user_agent: &str, features: &[HelloFeature]) -> Result<Self> {
        if user_agent.len() > u16::MAX as usize {
            return Err(McbpError::InvalidArgument(format!(
                "user agent too long: {} bytes",
                user_agent.len()
            )));
        }

        let value = features
            .iter()
            .flat_map(|feature| (*feature as u16).to_be_bytes())
            .collect();
        Ok(Self {
            user_agent: user_agent.as_bytes().to_vec(),
            value,
        })
    }
}

impl RequestBody for HelloRequestBody {
    const OPCODE: ClientOpcode = ClientOpcode::Hello;
    type Response = HelloResponseBody;

    fn key(&self) -> &[u8] {
        &self.user_agent
    }

    fn value(&self) -> &[u8] {
        &self.value
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelloResponseBody {
    codes: Vec<u16>,
}

impl HelloResponseBody {
    /// Raw feature codes the server enabled, including unknown ones
    pub fn feature_codes(&self) -> &[u16] {
        &self.codes
    }

    /// Enabled features this client knows about
    pub fn supported_features(&self) -> Vec<HelloFeature> {
        self.codes.iter().copied().filter_map(HelloFeature::from_code).collect()
    }

    pub fn supports(&self, feature: HelloFeature) -> bool {
        self.codes.contains(&(feature as u16))
    }
}

impl ResponseBody for HelloResponseBody {
    const OPCODE: ClientOpcode = ClientOpcode::Hello;

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
        if regions.value.len() % 2 != 0 {
            return false;
        }

        self.codes = regions
            .value
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        true
    }
}
