//! Periodic forced close of the stream connection.
//!
//! The remote end can go quiet without closing the socket. Rather than
//! detecting that, the reaper closes whatever connection is open on a fixed
//! period and lets the reader reconnect.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::connection::ConnectionManager;
use super::shutdown::ShutdownFlag;

pub struct IdleReaper {
    connections: Arc<ConnectionManager>,
    flag: ShutdownFlag,
    period: Duration,
}

impl IdleReaper {
    pub fn new(connections: Arc<ConnectionManager>, flag: ShutdownFlag, period: Duration) -> Self {
        Self {
            connections,
            flag,
            period,
        }
    }

    /// Run detached. Nothing waits for the reaper at exit.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Close the connection every period; exit after the first tick that
    /// finds the shutdown flag set.
    pub async fn run(self) {
        let Some(first_tick) = Instant::now().checked_add(self.period) else {
            warn!(period = ?self.period, "Idle reap period out of range, reaper disabled");
            return;
        };
        let mut ticker = interval_at(first_tick, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if self.connections.force_close() {
                info!(
                    period_secs = self.period.as_secs(),
                    "Idle reaper closed stream connection"
                );
            } else {
                debug!("Idle reaper tick with no open connection");
            }
            if self.flag.is_set() {
                debug!("Idle reaper stopping");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FilterRequest;
    use crate::port::outbound::stream::StreamSource;
    use crate::testkit::stream::{Script, ScriptedSource};

    const PERIOD: Duration = Duration::from_secs(60);

    fn connections(scripts: Vec<Script>) -> Arc<ConnectionManager> {
        Arc::new(ConnectionManager::new(
            Arc::new(ScriptedSource::new(scripts)) as Arc<dyn StreamSource>,
            Duration::from_secs(5),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn closes_a_stalled_connection_after_one_period() {
        let connections = connections(vec![Script::Stall(Vec::new())]);
        let flag = ShutdownFlag::new();
        let _reaper = IdleReaper::new(Arc::clone(&connections), flag, PERIOD).spawn();

        let mut conn = connections
            .open(&FilterRequest::new(Vec::new()))
            .await
            .unwrap();
        let started = Instant::now();

        assert!(conn.next_chunk().await.is_none());
        assert!(conn.is_closed());
        assert_eq!(started.elapsed(), PERIOD);
    }

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_period_disables_the_reaper() {
        let connections = connections(vec![Script::Stall(Vec::new())]);
        let conn = connections
            .open(&FilterRequest::new(Vec::new()))
            .await
            .unwrap();

        IdleReaper::new(Arc::clone(&connections), ShutdownFlag::new(), Duration::MAX)
            .run()
            .await;

        assert!(!conn.is_closed());
        assert!(connections.has_active());
    }

    #[tokio::test(start_paused = true)]
    async fn exits_on_the_first_tick_after_shutdown() {
        let connections = connections(Vec::new());
        let flag = ShutdownFlag::new();
        let reaper = IdleReaper::new(connections, flag.clone(), PERIOD).spawn();

        tokio::time::sleep(Duration::from_secs(90)).await;
        assert!(!reaper.is_finished());

        flag.set();
        let started = Instant::now();
        reaper.await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }
}
