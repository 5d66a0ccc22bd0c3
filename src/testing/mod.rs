//! Testing utilities
//!
//! A scripted in-memory [`Transport`](crate::operations::Transport) and frame
//! builders, shared by unit and integration tests.

pub mod helpers;
pub mod scripted;

pub use helpers::{observe_value, respond_to};
pub use scripted::{ScriptedReply, ScriptedTransport};
