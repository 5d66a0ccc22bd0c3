//! SASL mechanism listing

use crate::protocol::{split_body, ClientOpcode, CmdInfo, Header, KeyValueStatus, RequestBody, ResponseBody};

/// Request for the server's supported SASL mechanisms; carries no regions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaslListMechsRequestBody;

impl RequestBody for SaslListMechsRequestBody {
    const OPCODE: ClientOpcode = ClientOpcode::SaslListMechs;
    type Response = SaslListMechsResponseBody;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaslListMechsResponseBody {
    supported_mechs: Vec<String>,
}

impl SaslListMechsResponseBody {
    /// Mechanism names in the order the server listed them
    pub fn supported_mechs(&self) -> &[String] {
        &self.supported_mechs
    }
}

impl ResponseBody for SaslListMechsResponseBody {
    const OPCODE: ClientOpcode = ClientOpcode::SaslListMechs;

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
        // No fallback list exists: a failed listing fails the negotiation.
        if !status.is_success() {
            return false;
        }
        let Some(regions) = split_body(body, framing_extras_size, key_size, extras_size) else {
            return false;
        };
        let Ok(names) = std::str::from_utf8(regions.value) else {
            return false;
        };

        self.supported_mechs = names
            .split(|c| c == ' ' || c == '\0')
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        true
    }
}
