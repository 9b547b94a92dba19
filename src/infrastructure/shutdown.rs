//! Process-wide shutdown state and the signal handling that drives it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::connection::ConnectionManager;
use crate::error::Result;

struct FlagState {
    stopped: Mutex<bool>,
    notify: watch::Sender<bool>,
}

/// One-way stop flag shared by every long-running task.
///
/// Once set it stays set. Tasks poll it with [`is_set`](Self::is_set) or
/// wait on it with [`stopped`](Self::stopped).
#[derive(Clone)]
pub struct ShutdownFlag {
    inner: Arc<FlagState>,
}

impl ShutdownFlag {
    #[must_use]
    pub fn new() -> Self {
        let (notify, _) = watch::channel(false);
        Self {
            inner: Arc::new(FlagState {
                stopped: Mutex::new(false),
                notify,
            }),
        }
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        *self.inner.stopped.lock()
    }

    /// Set the flag and wake every waiter.
    ///
    /// Returns `true` only for the call that actually flipped it.
    pub fn set(&self) -> bool {
        let mut stopped = self.inner.stopped.lock();
        if *stopped {
            return false;
        }
        *stopped = true;
        self.inner.notify.send_replace(true);
        true
    }

    /// Resolves once the flag is set (immediately if it already is).
    pub async fn stopped(&self) {
        let mut rx = self.inner.notify.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|stopped| *stopped).await;
    }

    /// Sleep for `duration`, cut short if the flag gets set.
    ///
    /// Returns `true` if the full duration elapsed.
    pub async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            () = self.stopped() => false,
            () = tokio::time::sleep(duration) => true,
        }
    }
}

impl Default for ShutdownFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShutdownFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownFlag")
            .field("stopped", &self.is_set())
            .finish()
    }
}

/// Turns a stop request into a graceful shutdown.
///
/// Triggering sets the [`ShutdownFlag`], wakes everything waiting on it and
/// force-closes the active connection so a blocked read returns at once.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    flag: ShutdownFlag,
    connections: Arc<ConnectionManager>,
}

impl ShutdownCoordinator {
    pub fn new(flag: ShutdownFlag, connections: Arc<ConnectionManager>) -> Self {
        Self { flag, connections }
    }

    #[must_use]
    pub fn flag(&self) -> &ShutdownFlag {
        &self.flag
    }

    /// Begin shutdown. Later calls are no-ops and return `false`.
    pub fn trigger(&self) -> bool {
        if !self.flag.set() {
            debug!("Shutdown already in progress");
            return false;
        }
        info!("Stopping...");
        if self.connections.force_close() {
            info!("Closed active stream connection");
        }
        true
    }

    /// Trigger shutdown once `stop` resolves.
    pub fn spawn<F>(self, stop: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            stop.await;
            self.trigger();
        })
    }
}

/// OS termination signals, registered up front.
///
/// Handlers are installed by [`install`](Self::install) so that a signal
/// arriving during startup is not lost and does not kill the process.
pub struct SignalListener {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl SignalListener {
    /// # Errors
    ///
    /// Returns an I/O error if a handler cannot be registered.
    #[cfg(unix)]
    pub fn install() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// # Errors
    ///
    /// Never fails on this platform.
    #[cfg(not(unix))]
    pub fn install() -> Result<Self> {
        Ok(Self {})
    }

    /// Wait for the first termination signal and return its name.
    ///
    /// Further signals are absorbed by the installed handlers.
    #[cfg(unix)]
    pub async fn recv(mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(self) -> &'static str {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        "Ctrl+C"
    }
}
