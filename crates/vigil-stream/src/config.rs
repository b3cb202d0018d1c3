//! # Stream Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`crate::StreamingTransport`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Reconnect automatically after an unexpected close or error.
    pub auto_reconnect: bool,

    /// Maximum consecutive reconnect attempts before giving up silently.
    /// An explicit `connect()` resets the budget, as does a session that
    /// delivers at least one frame.
    pub max_reconnect_attempts: u32,

    /// Fixed delay between reconnect attempts, in milliseconds.
    pub reconnect_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            max_reconnect_attempts: 10,
            reconnect_delay_ms: 2_000,
        }
    }
}

impl StreamConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            auto_reconnect: true,
            max_reconnect_attempts: 3,
            reconnect_delay_ms: 10,
        }
    }

    /// Reconnect delay as a `Duration`.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}
