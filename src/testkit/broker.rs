//! Mock [`Broker`] for testing.
//!
//! [`RecordingBroker`] is cheaply cloneable; clones share state, so a test
//! can keep one and hand another to the publisher.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::port::outbound::broker::Broker;

/// A successfully published message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl Published {
    pub fn payload_str(&self) -> &str {
        std::str::from_utf8(&self.payload).unwrap()
    }
}

#[derive(Clone, Default)]
pub struct RecordingBroker {
    published: Arc<Mutex<Vec<Published>>>,
    failures: Arc<Mutex<VecDeque<String>>>,
    attempts: Arc<AtomicU32>,
    stops: Arc<AtomicU32>,
}

impl RecordingBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` publish attempts.
    pub fn fail_next(&self, n: usize, reason: &str) {
        let mut failures = self.failures.lock().unwrap();
        for _ in 0..n {
            failures.push_back(reason.to_string());
        }
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }

    /// Payloads of every successful publish, in order.
    pub fn payloads(&self) -> Vec<String> {
        self.published()
            .iter()
            .map(|p| p.payload_str().to_string())
            .collect()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> u32 {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Broker for RecordingBroker {
    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.failures.lock().unwrap().pop_front() {
            return Err(Error::Broker(reason));
        }
        self.published.lock().unwrap().push(Published {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        });
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn broker_name(&self) -> &'static str {
        "recording"
    }
}
