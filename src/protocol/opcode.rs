//! Opcode registry
//!
//! The closed set of supported commands and their body types.

use crate::error::ParseError;

/// Command codes understood by this client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ClientOpcode {
    Get = 0x00,
    Noop = 0x0a,
    Hello = 0x1f,
    SaslListMechs = 0x20,
    SaslAuth = 0x21,
    SaslStep = 0x22,
    Observe = 0x92,
}

impl ClientOpcode {
    /// Every registered opcode, in code order
    pub const ALL: [ClientOpcode; 7] = [
        ClientOpcode::Get,
        ClientOpcode::Noop,
        ClientOpcode::Hello,
        ClientOpcode::SaslListMechs,
        ClientOpcode::SaslAuth,
        ClientOpcode::SaslStep,
        ClientOpcode::Observe,
    ];

    pub fn name(self) -> &'static str {
        descriptor(self).name
    }
}

impl TryFrom<u8> for ClientOpcode {
    type Error = ParseError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x00 => Ok(ClientOpcode::Get),
            0x0a => Ok(ClientOpcode::Noop),
            0x1f => Ok(ClientOpcode::Hello),
            0x20 => Ok(ClientOpcode::SaslListMechs),
            0x21 => Ok(ClientOpcode::SaslAuth),
            0x22 => Ok(ClientOpcode::SaslStep),
            0x92 => Ok(ClientOpcode::Observe),
            _ => Err(ParseError::Malformed(format!("unknown opcode 0x{:02x}", byte))),
        }
    }
}

/// Static association of an opcode with its request and response body types
///
/// Opcodes that are recognized on the wire but have no body implementation
/// carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub opcode: ClientOpcode,
    pub name: &'static str,
    pub request_body: Option<&'static str>,
    pub response_body: Option<&'static str>,
}

impl CommandDescriptor {
    /// Whether frames with this opcode can be turned into typed bodies
    pub fn is_implemented(&self) -> bool {
        self.request_body.is_some() && self.response_body.is_some()
    }
}

/// Descriptor table, indexed the same way as `ClientOpcode::ALL`
pub static DESCRIPTORS: [CommandDescriptor; 7] = [
    CommandDescriptor {
        opcode: ClientOpcode::Get,
        name: "get",
        request_body: Some("GetRequestBody"),
        response_body: Some("GetResponseBody"),
    },
    CommandDescriptor {
        opcode: ClientOpcode::Noop,
        name: "noop",
        request_body: Some("NoopRequestBody"),
        response_body: Some("NoopResponseBody"),
    },
    CommandDescriptor {
        opcode: ClientOpcode::Hello,
        name: "hello",
        request_body: Some("HelloRequestBody"),
        response_body: Some("HelloResponseBody"),
    },
    CommandDescriptor {
        opcode: ClientOpcode::SaslListMechs,
        name: "sasl_list_mechs",
        request_body: Some("SaslListMechsRequestBody"),
        response_body: Some("SaslListMechsResponseBody"),
    },
    CommandDescriptor {
        opcode: ClientOpcode::SaslAuth,
        name: "sasl_auth",
        request_body: None,
        response_body: None,
    },
    CommandDescriptor {
        opcode: ClientOpcode::SaslStep,
        name: "sasl_step",
        request_body: None,
        response_body: None,
    },
    CommandDescriptor {
        opcode: ClientOpcode::Observe,
        name: "observe",
        request_body: Some("ExistsRequestBody"),
        response_body: Some("ExistsResponseBody"),
    },
];

/// Look up the descriptor for an opcode
pub fn descriptor(opcode: ClientOpcode) -> &'static CommandDescriptor {
    let index = match opcode {
        ClientOpcode::Get => 0,
        ClientOpcode::Noop => 1,
        ClientOpcode::Hello => 2,
        ClientOpcode::SaslListMechs => 3,
        ClientOpcode::SaslAuth => 4,
        ClientOpcode::SaslStep => 5,
        ClientOpcode::Observe => 6,
    };
    &DESCRIPTORS[index]
}
