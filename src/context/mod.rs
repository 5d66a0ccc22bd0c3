//! Context Module
//!
//! Outcome, dispatch and retry bookkeeping for one logical operation.
//!
//! ## Lifecycle
//! ```text
//!   ErrorContext::new()          (operation starts)
//!         │
//!         ├── record_dispatch()  (every attempt, overwrites)
//!         ├── record_retry()     (every retry decision)
//!         │
//!   freeze() ──► KeyValueErrorContext   (read-only, handed to caller)
//!                      │
//!                      └── recontextualize()  (at most once)
//! ```

mod error_context;
mod retry_reason;

pub use error_context::{ErrorContext, KeyValueDetails, KeyValueErrorContext};
pub use retry_reason::RetryReason;
