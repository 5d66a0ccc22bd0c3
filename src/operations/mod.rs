//! Operations Module
//!
//! Caller-facing key-value operations and the executor that drives them.
//!
//! ## Layers
//! ```text
//!   GetRequest / ExistsRequest / HelloRequest / ...   (KeyValueOperation)
//!                          │
//!                          ▼
//!                      Executor ──► RetryOrchestrator
//!                          │
//!                          ▼
//!                 Transport + Router   (supplied by the caller)
//! ```

mod executor;
mod transport;
mod exists;
mod get;
mod hello;
mod noop;
mod sasl_list_mechs;
pub mod observe_poll;

pub use executor::{Executor, KeyValueOperation, ResponseOf};
pub use transport::{Router, StaticRouter, Transport};
pub use exists::{ExistsRequest, ExistsResponse};
pub use get::{GetRequest, GetResponse};
pub use hello::{HelloRequest, HelloResponse};
pub use noop::{NoopRequest, NoopResponse};
pub use sasl_list_mechs::{SaslListMechsRequest, SaslListMechsResponse};
pub use observe_poll::{poll_until, poll_until_persisted};
