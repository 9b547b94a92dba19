//! Ownership of the single active stream connection.
//!
//! [`ConnectionManager`] is the only place a stream connection is created or
//! torn down. Other components hold an `Arc` to it and may request a forced
//! close at any time; they never see the connection itself.
//!
//! A forced close is delivered through a `watch` channel that every read on
//! the [`Connection`] races against, so a blocked read returns as soon as the
//! close is requested and the body (and its socket) is dropped right away.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{stream, StreamExt};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::FilterRequest;
use crate::error::{Error, Result};
use crate::port::outbound::stream::{ByteStream, StreamSource};

type Slot = Arc<Mutex<Option<ActiveConnection>>>;

/// Handle for the registered connection: its id and its close trigger.
struct ActiveConnection {
    id: u64,
    closer: watch::Sender<bool>,
}

impl ActiveConnection {
    fn abort(self) {
        // No receivers means the connection is already gone.
        let _ = self.closer.send(true);
    }
}

/// Owns the one live stream connection.
///
/// Invariant: at most one connection is registered at a time. Registering a
/// new one aborts the previous one under the same lock, so a concurrent
/// [`force_close`](Self::force_close) either hits the old handle before the
/// swap or the new handle after it, never neither.
pub struct ConnectionManager {
    source: Arc<dyn StreamSource>,
    connect_timeout: Duration,
    slot: Slot,
    next_id: AtomicU64,
}

impl ConnectionManager {
    pub fn new(source: Arc<dyn StreamSource>, connect_timeout: Duration) -> Self {
        Self {
            source,
            connect_timeout,
            slot: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn source_name(&self) -> &'static str {
        self.source.source_name()
    }

    /// Whether a connection is currently registered.
    #[must_use]
    pub fn has_active(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Close any existing connection, then open a new one.
    ///
    /// The new connection is registered before dialing, so a forced close
    /// issued while the dial is in flight aborts it.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectTimeout`] if the source does not answer in time
    /// - [`Error::ConnectionAborted`] if a forced close lands during the dial
    /// - any error the source reports (dial, auth, HTTP status)
    pub async fn open(&self, request: &FilterRequest) -> Result<Connection> {
        let (id, mut closed) = self.register();
        let dial = timeout(self.connect_timeout, self.source.connect(request));

        let dialed = tokio::select! {
            biased;
            _ = closed.wait_for(|closed| *closed) => None,
            result = dial => Some(result),
        };

        match dialed {
            None => {
                debug!(id, "Connection closed while dialing");
                Err(Error::ConnectionAborted)
            }
            Some(Err(_elapsed)) => {
                release(&self.slot, id);
                Err(Error::ConnectTimeout(self.connect_timeout))
            }
            Some(Ok(Err(e))) => {
                release(&self.slot, id);
                Err(e)
            }
            Some(Ok(Ok(body))) => {
                debug!(id, "Connection open");
                Ok(Connection {
                    id,
                    closed,
                    body,
                    slot: Arc::clone(&self.slot),
                })
            }
        }
    }

    /// Abort the active connection, if any.
    ///
    /// Never blocks on I/O and never fails; calling it with nothing open is a
    /// no-op. Returns whether a connection was closed.
    pub fn force_close(&self) -> bool {
        let active = self.slot.lock().take();
        match active {
            Some(active) => {
                debug!(id = active.id, "Force-closing connection");
                active.abort();
                true
            }
            None => false,
        }
    }

    fn register(&self) -> (u64, watch::Receiver<bool>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (closer, closed) = watch::channel(false);
        let previous = self.slot.lock().replace(ActiveConnection { id, closer });
        if let Some(previous) = previous {
            debug!(id = previous.id, "Closing previous connection before redial");
            previous.abort();
        }
        (id, closed)
    }
}

/// Remove `id` from the slot if it is still the registered connection.
fn release(slot: &Slot, id: u64) {
    let mut guard = slot.lock();
    if guard.as_ref().is_some_and(|active| active.id == id) {
        guard.take();
    }
}

/// An open stream connection.
///
/// Dropping it releases its registration in the manager.
pub struct Connection {
    id: u64,
    closed: watch::Receiver<bool>,
    body: ByteStream,
    slot: Slot,
}

impl Connection {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether a forced close has been requested for this connection.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow() || self.closed.has_changed().is_err()
    }

    /// Next chunk of the response body.
    ///
    /// Returns `None` when the body is exhausted or when the connection has
    /// been force-closed, whichever comes first.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes>> {
        if !self.is_closed() {
            tokio::select! {
                biased;
                _ = self.closed.wait_for(|closed| *closed) => {}
                chunk = self.body.next() => return chunk,
            }
        }
        self.body = Box::pin(stream::empty());
        None
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        release(&self.slot, self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::stream::{records, Script, ScriptedSource};

    fn manager(source: &Arc<ScriptedSource>) -> ConnectionManager {
        ConnectionManager::new(
            Arc::clone(source) as Arc<dyn StreamSource>,
            Duration::from_secs(5),
        )
    }

    fn request() -> FilterRequest {
        FilterRequest::new(vec!["cats".into()])
    }

    #[test]
    fn force_close_without_connection_is_a_no_op() {
        let source = Arc::new(ScriptedSource::new(Vec::new()));
        let manager = manager(&source);

        assert!(!manager.force_close());
        assert!(!manager.force_close());
        assert!(!manager.has_active());
    }

    #[tokio::test]
    async fn reads_body_until_exhausted() {
        let source = Arc::new(ScriptedSource::new(vec![Script::Body(records(&["cats"]))]));
        let manager = manager(&source);

        let mut conn = manager.open(&request()).await.unwrap();
        assert!(manager.has_active());
        assert!(conn.next_chunk().await.unwrap().is_ok());
        assert!(conn.next_chunk().await.is_none());
        assert!(!conn.is_closed());

        drop(conn);
        assert!(!manager.has_active());
    }

    #[tokio::test]
    async fn force_close_unblocks_a_stalled_read() {
        let source = Arc::new(ScriptedSource::new(vec![Script::Stall(Vec::new())]));
        let manager = Arc::new(manager(&source));

        let mut conn = manager.open(&request()).await.unwrap();
        let closer = Arc::clone(&manager);
        let read = tokio::spawn(async move {
            let chunk = conn.next_chunk().await;
            (chunk.is_none(), conn.is_closed())
        });

        tokio::task::yield_now().await;
        assert!(closer.force_close());
        assert_eq!(read.await.unwrap(), (true, true));

        assert!(!manager.force_close());
    }

    #[tokio::test]
    async fn opening_again_aborts_the_previous_connection() {
        let source = Arc::new(ScriptedSource::new(vec![
            Script::Stall(Vec::new()),
            Script::Stall(Vec::new()),
        ]));
        let manager = manager(&source);

        let mut first = manager.open(&request()).await.unwrap();
        let second = manager.open(&request()).await.unwrap();

        assert!(first.is_closed());
        assert!(first.next_chunk().await.is_none());
        assert!(!second.is_closed());

        // Dropping the stale connection must not unregister the live one.
        drop(first);
        assert!(manager.has_active());
        assert!(manager.force_close());
        assert!(second.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn dial_exceeding_timeout_fails_after_exactly_the_timeout() {
        let source = Arc::new(ScriptedSource::new(vec![Script::Hang]));
        let manager = manager(&source);

        let started = tokio::time::Instant::now();
        let result = manager.open(&request()).await;

        assert!(matches!(result, Err(Error::ConnectTimeout(t)) if t == Duration::from_secs(5)));
        assert_eq!(started.elapsed(), Duration::from_secs(5));
        assert!(!manager.has_active());
    }

    #[tokio::test]
    async fn force_close_during_dial_aborts_it() {
        let source = Arc::new(ScriptedSource::new(vec![Script::Hang]));
        let manager = Arc::new(manager(&source));

        let opener = Arc::clone(&manager);
        let open = tokio::spawn(async move { opener.open(&request()).await.map(|_| ()) });

        source.wait_for_connects(1).await;
        assert!(manager.force_close());
        assert!(matches!(open.await.unwrap(), Err(Error::ConnectionAborted)));
    }

    #[tokio::test]
    async fn failed_dial_leaves_nothing_registered() {
        let source = Arc::new(ScriptedSource::new(vec![Script::Fail(Error::Dial(
            "refused".to_string(),
        ))]));
        let manager = manager(&source);

        assert!(matches!(manager.open(&request()).await, Err(Error::Dial(_))));
        assert!(!manager.has_active());
    }
}
