//! Protocol Module
//!
//! Binary framing of key-value commands and their responses.
//!
//! ## Frame Format
//!
//! ### Classic Header (magic 0x80 request / 0x81 response)
//! ```text
//! ┌─────────┬──────────┬─────────────┬─────────────┬─────────────┬──────────────────┐
//! │Magic (1)│Opcode (1)│ Key Len (2) │Extras Len(1)│ Datatype (1)│ VBucket/Status(2)│
//! ├─────────┴──────────┴─────────────┴─────────────┴─────────────┴──────────────────┤
//! │ Total Body Length (4)  │  Opaque (4)  │              CAS (8)                    │
//! └────────────────────────┴──────────────┴─────────────────────────────────────────┘
//! ```
//!
//! ### Flexible Header (magic 0x08 request / 0x18 response)
//! Same as classic, except the two key length bytes are split into
//! framing extras length (1) and key length (1).
//!
//! ### Body
//! ```text
//! ┌──────────────────┬──────────┬──────────┬───────────────────┐
//! │ Framing Extras   │  Extras  │   Key    │       Value       │
//! └──────────────────┴──────────┴──────────┴───────────────────┘
//! ```
//!
//! All multi-byte integers are big-endian.

mod header;
mod frame;
mod opcode;
mod status;
mod body;
mod client_request;
mod client_response;
pub mod commands;

pub use header::{Header, Magic, HEADER_SIZE, MAX_BODY_SIZE};
pub use frame::{decode_frame, read_frame, write_frame, Frame};
pub use opcode::{descriptor, ClientOpcode, CommandDescriptor, DESCRIPTORS};
pub use status::{KeyValueStatus, StatusOutcome};
pub use body::{split_body, BodyRegions, CmdInfo, RequestBody, ResponseBody};
pub use client_request::ClientRequest;
pub use client_response::ClientResponse;
