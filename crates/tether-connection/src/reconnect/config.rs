//! Retry ceiling configuration

use serde::{Deserialize, Serialize};
use tether_core::{Result, TetherError};

/// Consecutive connection-loss failures tolerated before giving up
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Configuration for automatic reconnection behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Retry ceiling: the failure count at which recovery stops
    max_retries: u32,
}

impl ReconnectConfig {
    /// Create a new reconnect configuration
    ///
    /// A ceiling of 0 is raised to 1, so the first connection loss is fatal.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries: max_retries.max(1),
        }
    }

    /// Get the retry ceiling
    pub fn max_retries(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Reject a deserialized ceiling of 0, which [`ReconnectConfig::new`]
    /// would otherwise silently raise to 1.
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(TetherError::Configuration(
                "max_retries must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}
