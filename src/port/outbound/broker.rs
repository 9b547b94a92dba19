//! Message broker port.

use async_trait::async_trait;

use crate::error::Result;

/// A persistent client connection to a message broker.
///
/// Owned exclusively by the publisher, hence `&mut self`. Delivery is
/// best-effort: a failed publish is reported but never retried by callers.
#[async_trait]
pub trait Broker: Send {
    /// Publish one payload to `topic`.
    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<()>;

    /// Stop the client, releasing its connection. Safe to call twice.
    async fn stop(&mut self) -> Result<()>;

    /// Name of the broker for logging.
    fn broker_name(&self) -> &'static str;
}
