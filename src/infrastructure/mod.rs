//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! business logic.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`connection`] - Ownership of the single stream connection
//! - [`orchestration`] - Pipeline assembly and lifecycle
//! - [`reaper`] - Periodic forced close of idle connections
//! - [`shutdown`] - Stop flag, coordinator and OS signal handling

pub mod bootstrap;
pub mod config;
pub mod connection;
pub mod orchestration;
pub mod reaper;
pub mod shutdown;
