//! Adapters: concrete implementations of the [`port`](crate::port) traits.

pub mod outbound;
