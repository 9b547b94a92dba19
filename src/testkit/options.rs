//! Mock [`OptionProvider`] for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::TrackedTerm;
use crate::error::Result;
use crate::port::outbound::options::OptionProvider;

/// Returns scripted results first, then a fixed term list forever.
pub struct StaticOptions {
    scripted: Mutex<VecDeque<Result<Vec<TrackedTerm>>>>,
    terms: Vec<TrackedTerm>,
    load_count: Arc<AtomicU32>,
}

impl StaticOptions {
    pub fn new(terms: &[&str]) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            terms: terms.iter().map(|term| TrackedTerm::new(*term)).collect(),
            load_count: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Results to hand out before falling back to the fixed list.
    pub fn with_results(self, results: Vec<Result<Vec<TrackedTerm>>>) -> Self {
        *self.scripted.lock().unwrap() = results.into();
        self
    }

    pub fn load_count(&self) -> u32 {
        self.load_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OptionProvider for StaticOptions {
    async fn load_tracked_terms(&self) -> Result<Vec<TrackedTerm>> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        let scripted = self.scripted.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(self.terms.clone()))
    }
}
