//! Application services.
//!
//! The reader and publisher loops. They see the outside world only through
//! the ports and the [`ConnectionManager`](crate::infrastructure::connection::ConnectionManager);
//! the infrastructure layer wires them to concrete adapters.

pub mod publisher;
pub mod stream;

pub use publisher::{PublishSummary, Publisher};
pub use stream::StreamReader;
