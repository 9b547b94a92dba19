//! The stream reader loop.
//!
//! ```text
//!   ┌────────────┐  terms   ┌─────────┐  chunks  ┌─────────┐  events
//!   │ OptionProv │ ───────► │  open   │ ───────► │ decode  │ ───────► channel
//!   └────────────┘          └─────────┘          │ + match │
//!         ▲                                      └─────────┘
//!         │             backoff (interruptible)       │ end of stream
//!         └───────────────────────────────────────────┘
//! ```
//!
//! Every iteration reloads the tracked terms, so edits to the poll store
//! take effect on the next reconnect.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::decoder::RecordDecoder;
use crate::domain::{FilterRequest, MatchEvent, TermMatcher};
use crate::error::{Error, Result};
use crate::infrastructure::connection::ConnectionManager;
use crate::infrastructure::shutdown::ShutdownFlag;
use crate::port::outbound::options::OptionProvider;

/// Why a streaming attempt stopped reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The remote end finished the body.
    Exhausted,
    /// The connection was force-closed.
    Closed,
    /// A record could not be decoded.
    Malformed,
    /// Reading the body failed.
    ReadFailed,
}

/// Counters for one streaming attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptReport {
    pub terms: usize,
    pub records: u64,
    pub matches: u64,
    pub end: StreamEnd,
}

impl AttemptReport {
    fn new(terms: usize) -> Self {
        Self {
            terms,
            records: 0,
            matches: 0,
            end: StreamEnd::Exhausted,
        }
    }
}

pub struct StreamReader {
    options: Arc<dyn OptionProvider>,
    connections: Arc<ConnectionManager>,
    shutdown: ShutdownFlag,
    backoff: Duration,
}

impl StreamReader {
    pub fn new(
        options: Arc<dyn OptionProvider>,
        connections: Arc<ConnectionManager>,
        shutdown: ShutdownFlag,
        backoff: Duration,
    ) -> Self {
        Self {
            options,
            connections,
            shutdown,
            backoff,
        }
    }

    /// Run the reader on its own task.
    ///
    /// The task hands the channel sender back when it finishes, so the
    /// caller decides when the channel closes.
    pub fn spawn(self, votes: mpsc::Sender<MatchEvent>) -> JoinHandle<mpsc::Sender<MatchEvent>> {
        tokio::spawn(self.run(votes))
    }

    /// Connect, read, back off, repeat; until shutdown.
    ///
    /// Returns early if the receiving end of `votes` goes away.
    pub async fn run(self, votes: mpsc::Sender<MatchEvent>) -> mpsc::Sender<MatchEvent> {
        loop {
            if self.shutdown.is_set() {
                info!("Stream reader stopping");
                break;
            }

            info!(source = self.connections.source_name(), "Connecting to stream");
            match self.read_once(&votes).await {
                Ok(report) => info!(
                    terms = report.terms,
                    records = report.records,
                    matches = report.matches,
                    end = ?report.end,
                    "Stream attempt finished"
                ),
                Err(Error::ChannelClosed) => {
                    warn!("Match channel closed, stream reader stopping");
                    break;
                }
                Err(e) => warn!(error = %e, "Stream attempt failed"),
            }

            debug!(backoff_secs = self.backoff.as_secs(), "Waiting before reconnect");
            if !self.shutdown.sleep(self.backoff).await {
                debug!("Backoff cut short by shutdown");
            }
        }
        votes
    }

    /// One attempt: load terms, open, stream until the body ends.
    ///
    /// # Errors
    ///
    /// Errors from the option provider or the connect step, or
    /// [`Error::ChannelClosed`] if the publisher has gone away.
    pub async fn read_once(&self, votes: &mpsc::Sender<MatchEvent>) -> Result<AttemptReport> {
        let terms = self.options.load_tracked_terms().await?;
        let matcher = TermMatcher::new(&terms);
        let request = FilterRequest::new(terms);
        let mut report = AttemptReport::new(matcher.len());
        debug!(track = %request.track(), "Loaded tracked terms");

        if self.shutdown.is_set() {
            debug!("Shutdown requested while loading terms");
            report.end = StreamEnd::Closed;
            return Ok(report);
        }
        let mut connection = self.connections.open(&request).await?;

        // A stop requested between the loop check and registration would
        // otherwise find nothing to close.
        if self.shutdown.is_set() {
            debug!("Shutdown requested while connecting");
            report.end = StreamEnd::Closed;
            return Ok(report);
        }
        info!(id = connection.id(), "Reading stream");

        let mut decoder = RecordDecoder::new();
        report.end = 'stream: loop {
            let chunk = match connection.next_chunk().await {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    warn!(error = %e, "Stream read failed");
                    break StreamEnd::ReadFailed;
                }
                None if connection.is_closed() => break StreamEnd::Closed,
                None => break StreamEnd::Exhausted,
            };

            decoder.push(&chunk);
            loop {
                let record = match decoder.next_record() {
                    Ok(Some(record)) => record,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, pending = decoder.pending(), "Malformed record");
                        break 'stream StreamEnd::Malformed;
                    }
                };
                report.records += 1;

                for event in matcher.match_record(&record) {
                    info!(term = %event, "vote");
                    votes.send(event).await.map_err(|_| Error::ChannelClosed)?;
                    report.matches += 1;
                }
            }
        };

        Ok(report)
    }
}
