//! Concrete commands
//!
//! One request/response body pair per registered opcode, and
//! [`ResponsePayload`] to select the parser from a frame's opcode.

mod exists;
mod get;
mod hello;
mod noop;
mod sasl_list_mechs;

pub use exists::{ExistsRequestBody, ExistsResponseBody, ObserveStatus};
pub use get::{GetRequestBody, GetResponseBody};
pub use hello::{HelloFeature, HelloRequestBody, HelloResponseBody};
pub use noop::{NoopRequestBody, NoopResponseBody};
pub use sasl_list_mechs::{SaslListMechsRequestBody, SaslListMechsResponseBody};

use crate::error::{McbpError, Result};
use super::{ClientOpcode, ClientResponse, CmdInfo, Frame};

/// A response body of any registered command
#[derive(Debug, Clone)]
pub enum ResponsePayload {
    Get(GetResponseBody),
    Noop(NoopResponseBody),
    Hello(HelloResponseBody),
    SaslListMechs(SaslListMechsResponseBody),
    Observe(ExistsResponseBody),
}

impl ResponsePayload {
    /// Parse a response frame with the body type registered for its opcode
    pub fn parse(frame: Frame, info: &CmdInfo) -> Result<Self> {
        match frame.opcode {
            ClientOpcode::Get => {
                ClientResponse::<GetResponseBody>::parse(frame, info).map(|r| Self::Get(r.into_body()))
            }
            ClientOpcode::Noop => {
                ClientResponse::<NoopResponseBody>::parse(frame, info).map(|r| Self::Noop(r.into_body()))
            }
            ClientOpcode::Hello => ClientResponse::<HelloResponseBody>::parse(frame, info)
                .map(|r| Self::Hello(r.into_body())),
            ClientOpcode::SaslListMechs => {
                ClientResponse::<SaslListMechsResponseBody>::parse(frame, info)
                    .map(|r| Self::SaslListMechs(r.into_body()))
            }
            ClientOpcode::Observe => ClientResponse::<ExistsResponseBody>::parse(frame, info)
                .map(|r| Self::Observe(r.into_body())),
            ClientOpcode::SaslAuth | ClientOpcode::SaslStep => Err(McbpError::Protocol(format!(
                "no response body registered for {}",
                frame.opcode.name()
            ))),
        }
    }

    pub fn opcode(&self) -> ClientOpcode {
        match self {
            Self::Get(_) => ClientOpcode::Get,
            Self::Noop(_) => ClientOpcode::Noop,
            Self::Hello(_) => ClientOpcode::Hello,
            Self::SaslListMechs(_) => ClientOpcode::SaslListMechs,
            Self::Observe(_) => ClientOpcode::Observe,
        }
    }
}
