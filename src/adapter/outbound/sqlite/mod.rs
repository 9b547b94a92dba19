//! SQLite persistence adapters.
//!
//! Holds the poll documents whose options are the tracked terms, using
//! Diesel ORM over an r2d2 connection pool.

pub mod database;
pub mod poll_store;

pub use poll_store::SqlitePollStore;
