//! Forwarding match events to the broker.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::MatchEvent;
use crate::port::outbound::broker::Broker;

/// What the publisher did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub published: u64,
    pub failed: u64,
}

/// Drains the match channel into a broker topic.
///
/// A failed publish is logged and the event dropped; the loop carries on.
/// The loop ends only when the channel is closed and empty, after which the
/// broker is stopped.
pub struct Publisher {
    broker: Box<dyn Broker>,
    topic: String,
}

impl Publisher {
    pub fn new(broker: Box<dyn Broker>, topic: impl Into<String>) -> Self {
        Self {
            broker,
            topic: topic.into(),
        }
    }

    pub fn spawn(self, votes: mpsc::Receiver<MatchEvent>) -> JoinHandle<PublishSummary> {
        tokio::spawn(self.run(votes))
    }

    pub async fn run(mut self, mut votes: mpsc::Receiver<MatchEvent>) -> PublishSummary {
        let mut summary = PublishSummary::default();
        info!(
            broker = self.broker.broker_name(),
            topic = %self.topic,
            "Publisher started"
        );

        while let Some(event) = votes.recv().await {
            match self.broker.publish(&self.topic, event.payload()).await {
                Ok(()) => {
                    summary.published += 1;
                    debug!(term = %event, "Published vote");
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(term = %event, error = %e, "Failed to publish vote");
                }
            }
        }

        info!("Publisher stopping");
        if let Err(e) = self.broker.stop().await {
            warn!(error = %e, "Failed to stop broker producer");
        }
        summary
    }
}
