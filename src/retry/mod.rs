//! Retry Module
//!
//! Decides whether a failed attempt is re-issued.
//!
//! ## Decision Table
//! ```text
//! ┌─────────────┬──────────────────────────────────────────────────────────┐
//! │ Strategy    │ Retries                                                  │
//! ├─────────────┼──────────────────────────────────────────────────────────┤
//! │ None        │ nothing                                                  │
//! │ FailFast    │ always-retry reasons (topology changes)                  │
//! │ BestEffort  │ retryable reasons; non-idempotent requests only those    │
//! │             │ proven safe to repeat                                    │
//! └─────────────┴──────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine answers "retry or stop". Timing belongs to the executor.

mod strategy;
mod orchestrator;

pub use strategy::{RetryContext, RetryStrategy};
pub use orchestrator::{controlled_backoff, RetryDecision, RetryOrchestrator};
