//! Mock [`StreamSource`] for testing.
//!
//! [`ScriptedSource`] pops one [`Script`] per `connect()` call and records
//! every request it was asked to open, with the (tokio) time of the call.
//! Once the scripts run out, each further connect yields a body that never
//! produces anything, which keeps retry loops from spinning.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::domain::FilterRequest;
use crate::error::{Error, Result};
use crate::port::outbound::stream::{ByteStream, StreamSource};

/// What a single `connect()` call does.
pub enum Script {
    /// Connect succeeds; the body yields these items then ends.
    Body(Vec<Result<Bytes>>),
    /// Connect succeeds; the body yields these chunks then goes silent forever.
    Stall(Vec<Bytes>),
    /// Connect succeeds; chunks are fed through a [`FeedHandle`]. The body
    /// ends when the handle is dropped.
    Feed(mpsc::UnboundedReceiver<Bytes>),
    /// Connect fails with this error.
    Fail(Error),
    /// Connect never completes.
    Hang,
}

/// Sender side of a [`Script::Feed`] body.
pub struct FeedHandle {
    tx: mpsc::UnboundedSender<Bytes>,
}

impl FeedHandle {
    /// Push raw bytes into the body. Returns `false` if the reader is gone.
    pub fn push(&self, chunk: impl Into<Bytes>) -> bool {
        self.tx.send(chunk.into()).is_ok()
    }

    /// Push one JSON record with the given text.
    pub fn push_record(&self, text: &str) -> bool {
        self.push(record_line(text))
    }
}

/// Create a [`Script::Feed`] and its control handle.
pub fn feed() -> (Script, FeedHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Script::Feed(rx), FeedHandle { tx })
}

/// One newline-terminated record as the stream would deliver it.
pub fn record_line(text: &str) -> Bytes {
    let mut line = serde_json::json!({ "text": text }).to_string();
    line.push_str("\r\n");
    Bytes::from(line)
}

/// One chunk per record.
pub fn records(texts: &[&str]) -> Vec<Result<Bytes>> {
    texts.iter().map(|text| Ok(record_line(text))).collect()
}

/// A `connect()` call as seen by the source.
#[derive(Debug, Clone)]
pub struct ConnectCall {
    pub request: FilterRequest,
    pub at: Instant,
}

pub struct ScriptedSource {
    scripts: Mutex<VecDeque<Script>>,
    calls: Mutex<Vec<ConnectCall>>,
    count: watch::Sender<usize>,
}

impl ScriptedSource {
    pub fn new(scripts: Vec<Script>) -> Self {
        let (count, _) = watch::channel(0);
        Self {
            scripts: Mutex::new(scripts.into()),
            calls: Mutex::new(Vec::new()),
            count,
        }
    }

    pub fn connect_count(&self) -> usize {
        *self.count.borrow()
    }

    pub fn calls(&self) -> Vec<ConnectCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until `connect()` has been called at least `n` times.
    pub async fn wait_for_connects(&self, n: usize) {
        let mut rx = self.count.subscribe();
        let _ = rx.wait_for(|count| *count >= n).await;
    }
}

#[async_trait]
impl StreamSource for ScriptedSource {
    async fn connect(&self, request: &FilterRequest) -> Result<ByteStream> {
        self.calls.lock().unwrap().push(ConnectCall {
            request: request.clone(),
            at: Instant::now(),
        });
        let script = self.scripts.lock().unwrap().pop_front();
        self.count.send_modify(|count| *count += 1);

        match script.unwrap_or(Script::Stall(Vec::new())) {
            Script::Body(items) => Ok(Box::pin(stream::iter(items))),
            Script::Stall(chunks) => Ok(Box::pin(
                stream::iter(chunks.into_iter().map(Ok)).chain(stream::pending()),
            )),
            Script::Feed(rx) => Ok(Box::pin(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|chunk| (Ok(chunk), rx))
            }))),
            Script::Fail(error) => Err(error),
            Script::Hang => std::future::pending().await,
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}
