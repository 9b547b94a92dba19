//! Twittervotes - stream poll votes from Twitter into a message broker.
//!
//! Tracked terms (poll options) are loaded from a SQLite poll store and used
//! to open a filtered stream. Every record whose text contains a term, case
//! insensitively, becomes one vote published to the broker topic `votes`.
//!
//! # Architecture
//!
//! ```text
//!   poll store ──► StreamReader ──► channel(1) ──► Publisher ──► nsqd
//!                       │
//!                ConnectionManager ◄── IdleReaper
//!                       ▲
//!               ShutdownCoordinator ◄── SIGINT / SIGTERM
//! ```
//!
//! # Modules
//!
//! - [`domain`] - Terms, records, matching and vote events
//! - [`port`] - Traits for the poll store, stream source and broker
//! - [`adapter`] - SQLite, Twitter and NSQ implementations of the ports
//! - [`application`] - Reader and publisher loops
//! - [`infrastructure`] - Config, connection ownership, shutdown and wiring
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - Expose mock ports for integration tests

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
