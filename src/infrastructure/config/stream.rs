//! Stream connection and liveness timing.

use std::time::Duration;

use serde::Deserialize;

/// Filtered-stream endpoint of the stream source.
pub const DEFAULT_STREAM_ENDPOINT: &str = "https://stream.twitter.com/1.1/statuses/filter.json";

/// Stream source and timing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Filtered stream endpoint (HTTPS POST).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Upper bound on establishing a stream connection (seconds).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Fixed wait between a finished or failed attempt and the next one (seconds).
    #[serde(default = "default_reconnect_backoff_secs")]
    pub reconnect_backoff_secs: u64,
    /// Period of the idle reaper's forced close (seconds).
    #[serde(default = "default_idle_reap_interval_secs")]
    pub idle_reap_interval_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_STREAM_ENDPOINT.to_string()
}

const fn default_connect_timeout_secs() -> u64 {
    5
}

const fn default_reconnect_backoff_secs() -> u64 {
    10
}

const fn default_idle_reap_interval_secs() -> u64 {
    60
}

impl StreamConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_secs(self.reconnect_backoff_secs)
    }

    #[must_use]
    pub fn idle_reap_interval(&self) -> Duration {
        Duration::from_secs(self.idle_reap_interval_secs)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            connect_timeout_secs: default_connect_timeout_secs(),
            reconnect_backoff_secs: default_reconnect_backoff_secs(),
            idle_reap_interval_secs: default_idle_reap_interval_secs(),
        }
    }
}
