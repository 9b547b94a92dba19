//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`stream`] - `ScriptedSource`, a mock [`StreamSource`](crate::port::StreamSource)
//!   with scripted connect outcomes and bodies.
//! - [`options`] - `StaticOptions`, a mock [`OptionProvider`](crate::port::OptionProvider).
//! - [`broker`] - `RecordingBroker`, a mock [`Broker`](crate::port::Broker).

pub mod broker;
pub mod options;
pub mod stream;
