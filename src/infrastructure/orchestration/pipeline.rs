//! Pipeline assembly.

use std::sync::Arc;
use std::time::Duration;

use crate::application::{Publisher, StreamReader};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::connection::ConnectionManager;
use crate::infrastructure::reaper::IdleReaper;
use crate::infrastructure::shutdown::{ShutdownCoordinator, ShutdownFlag};
use crate::port::outbound::broker::Broker;
use crate::port::outbound::options::OptionProvider;
use crate::port::outbound::stream::StreamSource;

/// Capacity of the channel between reader and publisher.
///
/// A single slot: the reader blocks until the publisher has taken the
/// previous event.
pub const MATCH_CHANNEL_CAPACITY: usize = 1;

/// Timing and routing knobs for a [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub connect_timeout: Duration,
    pub reconnect_backoff: Duration,
    pub idle_reap_interval: Duration,
    pub topic: String,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            connect_timeout: config.stream.connect_timeout(),
            reconnect_backoff: config.stream.reconnect_backoff(),
            idle_reap_interval: config.stream.idle_reap_interval(),
            topic: config.broker.topic.clone(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Every long-running component, wired to one connection manager and one
/// shutdown flag. Start it with [`Pipeline::run`].
pub struct Pipeline {
    pub(super) reader: StreamReader,
    pub(super) publisher: Publisher,
    pub(super) reaper: IdleReaper,
    pub(super) coordinator: ShutdownCoordinator,
    connections: Arc<ConnectionManager>,
}

impl Pipeline {
    pub fn assemble(
        options: Arc<dyn OptionProvider>,
        source: Arc<dyn StreamSource>,
        broker: Box<dyn Broker>,
        settings: PipelineSettings,
    ) -> Self {
        let connections = Arc::new(ConnectionManager::new(source, settings.connect_timeout));
        let flag = ShutdownFlag::new();

        Self {
            reader: StreamReader::new(
                options,
                Arc::clone(&connections),
                flag.clone(),
                settings.reconnect_backoff,
            ),
            publisher: Publisher::new(broker, settings.topic),
            reaper: IdleReaper::new(
                Arc::clone(&connections),
                flag.clone(),
                settings.idle_reap_interval,
            ),
            coordinator: ShutdownCoordinator::new(flag, Arc::clone(&connections)),
            connections,
        }
    }

    #[must_use]
    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    /// Handle for triggering shutdown from outside, e.g. in tests.
    #[must_use]
    pub fn coordinator(&self) -> ShutdownCoordinator {
        self.coordinator.clone()
    }
}
