//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams where the pipeline meets the outside world. Each one
//! is implemented by an adapter for production and by a double in
//! [`testkit`](crate::testkit) for tests.
//!
//! ```text
//!   ┌──────────────┐      ┌──────────────────────┐      ┌──────────┐
//!   │OptionProvider│ ───▶ │ Stream Reader ─▶ Pub │ ───▶ │  Broker  │
//!   └──────────────┘      └──────────────────────┘      └──────────┘
//!                                   ▲
//!                          ┌────────┴───────┐
//!                          │  StreamSource  │
//!                          └────────────────┘
//! ```

pub mod outbound;

pub use outbound::broker::Broker;
pub use outbound::options::OptionProvider;
pub use outbound::stream::{ByteStream, StreamSource};
