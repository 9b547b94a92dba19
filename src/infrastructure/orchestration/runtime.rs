//! Pipeline lifecycle.

use std::future::Future;

use tokio::sync::mpsc;
use tracing::{error, info};

use super::pipeline::{Pipeline, MATCH_CHANNEL_CAPACITY};
use crate::application::PublishSummary;
use crate::error::Result;

impl Pipeline {
    /// Run until `stop` resolves and everything has drained.
    ///
    /// Shutdown order: the coordinator sets the stop flag and closes the
    /// connection; the reader finishes and hands back the channel sender;
    /// dropping it closes the channel; the publisher drains what is left and
    /// stops the broker. The idle reaper is left to exit on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader or publisher task panicked.
    pub async fn run<F>(self, stop: F) -> Result<PublishSummary>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (votes_tx, votes_rx) = mpsc::channel(MATCH_CHANNEL_CAPACITY);

        let publisher = self.publisher.spawn(votes_rx);
        let reader = self.reader.spawn(votes_tx);
        let _reaper = self.reaper.spawn();
        let _stop = self.coordinator.spawn(stop);
        info!("Pipeline running");

        // The sender comes back with the reader, so the channel cannot close
        // before the reader has stopped sending.
        let reader_outcome = reader.await.map(drop);
        match &reader_outcome {
            Ok(()) => info!("Stream reader stopped"),
            Err(e) => error!(error = %e, "Stream reader task failed"),
        }

        let summary = publisher.await?;
        info!(
            published = summary.published,
            failed = summary.failed,
            "Publisher stopped"
        );

        reader_outcome?;
        Ok(summary)
    }
}
