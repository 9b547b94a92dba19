use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use twittervotes::application::PublishSummary;
use twittervotes::error::Result;
use twittervotes::infrastructure::orchestration::{Pipeline, PipelineSettings};
use twittervotes::infrastructure::shutdown::ShutdownCoordinator;
use twittervotes::port::{OptionProvider, StreamSource};
use twittervotes::testkit::broker::RecordingBroker;
use twittervotes::testkit::options::StaticOptions;
use twittervotes::testkit::stream::{Script, ScriptedSource};

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const BACKOFF: Duration = Duration::from_secs(10);
pub const REAP_INTERVAL: Duration = Duration::from_secs(60);

pub fn settings() -> PipelineSettings {
    PipelineSettings {
        connect_timeout: CONNECT_TIMEOUT,
        reconnect_backoff: BACKOFF,
        idle_reap_interval: REAP_INTERVAL,
        topic: "votes".to_string(),
    }
}

/// A running pipeline wired to mock ports, stopped through a oneshot.
pub struct RunningPipeline {
    pub source: Arc<ScriptedSource>,
    pub broker: RecordingBroker,
    pub coordinator: ShutdownCoordinator,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<PublishSummary>>,
}

impl RunningPipeline {
    pub fn start(terms: &[&str], scripts: Vec<Script>) -> Self {
        Self::start_with(Arc::new(StaticOptions::new(terms)), scripts, settings())
    }

    pub fn start_with(
        options: Arc<dyn OptionProvider>,
        scripts: Vec<Script>,
        settings: PipelineSettings,
    ) -> Self {
        let source = Arc::new(ScriptedSource::new(scripts));
        let broker = RecordingBroker::new();
        let pipeline = Pipeline::assemble(
            options,
            Arc::clone(&source) as Arc<dyn StreamSource>,
            Box::new(broker.clone()),
            settings,
        );
        let coordinator = pipeline.coordinator();

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(pipeline.run(async move {
            let _ = stop_rx.await;
        }));

        Self {
            source,
            broker,
            coordinator,
            stop: Some(stop_tx),
            handle,
        }
    }

    /// Deliver the stop request, as a termination signal would.
    pub fn signal(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// Signal and wait for the pipeline to finish.
    pub async fn shutdown(mut self) -> PublishSummary {
        self.signal();
        self.handle.await.unwrap().unwrap()
    }

    pub async fn join(self) -> PublishSummary {
        self.handle.await.unwrap().unwrap()
    }

    /// Wait until `n` votes have been published.
    pub async fn wait_for_published(&self, n: usize) {
        while self.broker.published().len() < n {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}
