//! # Watcher Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`crate::LifecycleWatcher`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Default poll interval in seconds, used when a subscription does not
    /// override it.
    pub poll_interval_secs: u64,

    /// Upper bound on any single fetch, in milliseconds. A timed-out fetch
    /// is a transient failure, not a crash.
    pub fetch_timeout_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            fetch_timeout_ms: 10_000,
        }
    }
}

impl WatcherConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            poll_interval_secs: 1,
            fetch_timeout_ms: 250,
        }
    }

    /// Default poll interval as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Fetch timeout as a `Duration`.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
