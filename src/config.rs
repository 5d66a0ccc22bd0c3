//! Configuration for mcbp-core
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{McbpError, Result};
use crate::protocol::MAX_BODY_SIZE;
use crate::retry::RetryStrategy;

/// Main configuration for an operation executor
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Timeout Configuration
    // -------------------------------------------------------------------------
    /// Deadline for a whole key-value operation, including retries (milliseconds)
    pub kv_timeout_ms: u64,

    /// Interval between observe polls while waiting for durability (milliseconds)
    pub observe_poll_interval_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Largest response body accepted from the server (in bytes)
    pub max_body_size: usize,

    /// Client name announced in HELLO
    pub user_agent: String,

    // -------------------------------------------------------------------------
    // Retry Configuration
    // -------------------------------------------------------------------------
    /// Strategy used by operations that do not pick one explicitly
    pub default_retry_strategy: RetryStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kv_timeout_ms: 2500,
            observe_poll_interval_ms: 50,
            max_body_size: MAX_BODY_SIZE,
            user_agent: format!("mcbp-core/{}", crate::VERSION),
            default_retry_strategy: RetryStrategy::BestEffort,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Operation deadline as a Duration
    pub fn kv_timeout(&self) -> Duration {
        Duration::from_millis(self.kv_timeout_ms)
    }

    /// Observe poll interval as a Duration
    pub fn observe_poll_interval(&self) -> Duration {
        Duration::from_millis(self.observe_poll_interval_ms)
    }

    /// Reject values the executor cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.kv_timeout_ms == 0 {
            return Err(McbpError::Config("kv_timeout_ms must be positive".to_string()));
        }
        if self.observe_poll_interval_ms == 0 {
            return Err(McbpError::Config(
                "observe_poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.max_body_size == 0 {
            return Err(McbpError::Config("max_body_size must be positive".to_string()));
        }
        if self.user_agent.len() > u16::MAX as usize {
            return Err(McbpError::Config(format!(
                "user_agent too long: {} bytes",
                self.user_agent.len()
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the operation deadline (in milliseconds)
    pub fn kv_timeout_ms(mut self, ms: u64) -> Self {
        self.config.kv_timeout_ms = ms;
        self
    }

    /// Set the observe poll interval (in milliseconds)
    pub fn observe_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.observe_poll_interval_ms = ms;
        self
    }

    /// Set the largest accepted response body (in bytes)
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Set the client name announced in HELLO
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the fallback retry strategy
    pub fn default_retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.config.default_retry_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
