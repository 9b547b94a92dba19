//! Option provider port.

use async_trait::async_trait;

use crate::domain::TrackedTerm;
use crate::error::Result;

/// Supplies the current list of tracked terms.
///
/// Called once per stream connection attempt; the returned set is fixed for
/// the lifetime of that attempt.
#[async_trait]
pub trait OptionProvider: Send + Sync {
    /// Load every tracked term currently configured.
    async fn load_tracked_terms(&self) -> Result<Vec<TrackedTerm>>;
}
