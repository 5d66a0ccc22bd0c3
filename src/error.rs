//! Error types for mcbp-core
//!
//! Frame-level, dispatch-level and operation-level errors, plus the
//! classified [`ErrorKind`] carried in every error context.

use serde::Serialize;
use thiserror::Error;

use crate::context::RetryReason;

/// Result type alias using McbpError
pub type Result<T> = std::result::Result<T, McbpError>;

/// Unified error type for mcbp-core operations
#[derive(Debug, Error)]
pub enum McbpError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Wire Errors
    // -------------------------------------------------------------------------
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Operation Errors
    // -------------------------------------------------------------------------
    #[error("Retry declined for {reason} after {attempts} attempts: {kind}")]
    RetryExhausted {
        reason: RetryReason,
        attempts: u32,
        kind: ErrorKind,
    },

    #[error("Operation failed: {0}")]
    Operation(ErrorKind),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Outcome has already been recontextualized")]
    AlreadyRecontextualized,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure to interpret bytes as a frame
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Declared lengths exceed the available buffer
    #[error("Truncated frame: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    /// Unknown magic/opcode, or internally inconsistent length fields
    #[error("Malformed frame: {0}")]
    Malformed(String),
}

/// Transport-level failure of a single wire attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The connection closed while the request was in flight
    #[error("Connection closed while request was in flight")]
    ConnectionClosed,

    /// No response within the attempt deadline
    #[error("Dispatch timed out")]
    Timeout,

    /// No usable connection; the request never left the client
    #[error("No connection available to endpoint")]
    NotConnected,

    /// The transport could not frame the bytes it received
    #[error("Transport framing failure: {0}")]
    Frame(#[from] ParseError),
}

/// Classified terminal failure of a logical operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    #[error("request canceled")]
    RequestCanceled,

    #[error("unambiguous timeout")]
    UnambiguousTimeout,

    #[error("ambiguous timeout")]
    AmbiguousTimeout,

    #[error("parsing failure")]
    ParsingFailure,

    #[error("protocol error")]
    ProtocolError,

    #[error("document not found")]
    DocumentNotFound,

    #[error("document exists")]
    DocumentExists,

    #[error("document locked")]
    DocumentLocked,

    #[error("value too large")]
    ValueTooLarge,

    #[error("invalid argument")]
    InvalidArgument,

    #[error("temporary failure")]
    TemporaryFailure,

    #[error("service not available")]
    ServiceNotAvailable,

    #[error("authentication failure")]
    AuthenticationFailure,

    #[error("internal server failure")]
    InternalServerFailure,

    #[error("unsupported operation")]
    UnsupportedOperation,

    #[error("durability impossible")]
    DurabilityImpossible,

    #[error("durable write in progress")]
    DurableWriteInProgress,

    #[error("collection not found")]
    CollectionNotFound,
}

impl DispatchError {
    /// Classify this failure into the reason handed to the retry engine
    pub fn retry_reason(&self) -> RetryReason {
        match self {
            DispatchError::NotConnected => RetryReason::SocketNotAvailable,
            DispatchError::ConnectionClosed => RetryReason::SocketClosedWhileInFlight,
            DispatchError::Timeout => RetryReason::Unknown,
            DispatchError::Frame(_) => RetryReason::DoNotRetry,
        }
    }

    /// Whether the request may have reached the server
    pub fn may_have_reached_server(&self) -> bool {
        !matches!(self, DispatchError::NotConnected)
    }
}
