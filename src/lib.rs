//! # mcbp-core
//!
//! Client-side core of a binary key-value wire protocol:
//! - Bit-exact frame codec (classic and flexible framing)
//! - Typed request/response bodies per opcode
//! - Retry policy engine keyed by retry reasons
//! - Error contexts that travel with every response
//! - An async executor driving operations over a pluggable transport
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │               Operations (Get, Exists, Hello, ...)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Executor                               │
//! │         (encode, correlate, classify, back off)              │
//! └──────────┬───────────────────────────────┬──────────────────┘
//!            │                               │
//!            ▼                               ▼
//!   ┌─────────────────┐             ┌─────────────────┐
//!   │    Protocol     │             │  Retry Engine   │
//!   │ (frames, bodies)│             │   + Contexts    │
//!   └────────┬────────┘             └─────────────────┘
//!            │
//!            ▼
//!   ┌─────────────────┐
//!   │    Transport    │
//!   │ (caller-owned)  │
//!   └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod document_id;

pub mod protocol;
pub mod context;
pub mod retry;
pub mod operations;
pub mod testing;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DispatchError, ErrorKind, McbpError, ParseError, Result};
pub use config::{Config, ConfigBuilder};
pub use document_id::DocumentId;
pub use context::{ErrorContext, KeyValueErrorContext, RetryReason};
pub use retry::{RetryContext, RetryStrategy};
pub use operations::{Executor, KeyValueOperation, StaticRouter, Transport};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of mcbp-core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
