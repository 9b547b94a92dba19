//! Message broker configuration.

use std::time::Duration;

use serde::Deserialize;

/// Topic every match is published to.
pub const DEFAULT_TOPIC: &str = "votes";

/// nsqd connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    /// nsqd TCP address (`host:port`).
    #[serde(default = "default_address")]
    pub address: String,
    /// Topic matches are published to.
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Upper bound on dialing nsqd (seconds).
    #[serde(default = "default_dial_timeout_secs")]
    pub dial_timeout_secs: u64,
    /// Upper bound on nsqd answering one `PUB` (seconds).
    #[serde(default = "default_publish_timeout_secs")]
    pub publish_timeout_secs: u64,
}

fn default_address() -> String {
    "localhost:4150".to_string()
}

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

const fn default_dial_timeout_secs() -> u64 {
    5
}

const fn default_publish_timeout_secs() -> u64 {
    60
}

impl BrokerConfig {
    #[must_use]
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout_secs)
    }

    #[must_use]
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            topic: default_topic(),
            dial_timeout_secs: default_dial_timeout_secs(),
            publish_timeout_secs: default_publish_timeout_secs(),
        }
    }
}
