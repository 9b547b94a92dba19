//! Graceful shutdown from every state the reader can be in.

mod support;

use std::time::Duration;

use support::pipeline::RunningPipeline;
use tokio::time::Instant;
use twittervotes::error::Error;
use twittervotes::testkit::stream::{records, Script};

#[tokio::test(start_paused = true)]
async fn stop_while_dialing_aborts_the_dial() {
    let running = RunningPipeline::start(&["cats"], vec![Script::Hang]);
    running.source.wait_for_connects(1).await;

    let source = std::sync::Arc::clone(&running.source);
    let started = Instant::now();
    running.shutdown().await;

    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(source.connect_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_while_streaming_closes_the_connection() {
    let running = RunningPipeline::start(&["cats"], vec![Script::Stall(Vec::new())]);
    running.source.wait_for_connects(1).await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    let source = std::sync::Arc::clone(&running.source);
    let started = Instant::now();
    running.shutdown().await;

    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(source.connect_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_during_backoff_skips_the_wait() {
    let running = RunningPipeline::start(
        &["cats"],
        vec![Script::Fail(Error::Dial("connection refused".to_string()))],
    );
    running.source.wait_for_connects(1).await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    let source = std::sync::Arc::clone(&running.source);
    let started = Instant::now();
    running.shutdown().await;

    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(source.connect_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn repeated_stop_requests_are_harmless() {
    let mut running = RunningPipeline::start(&["cats"], vec![Script::Body(records(&["cats"]))]);
    running.wait_for_published(1).await;

    assert!(running.coordinator.trigger());
    assert!(!running.coordinator.trigger());
    running.signal();

    let summary = running.join().await;
    assert_eq!(summary.published, 1);
}

#[tokio::test(start_paused = true)]
async fn broker_is_stopped_exactly_once() {
    let running = RunningPipeline::start(&["cats"], Vec::new());
    running.source.wait_for_connects(1).await;

    let broker = running.broker.clone();
    running.shutdown().await;

    assert_eq!(broker.stop_count(), 1);
}
