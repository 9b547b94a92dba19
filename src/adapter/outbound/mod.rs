//! Outbound adapters (driven side).
//!
//! - [`twitter`] - filtered status stream ([`StreamSource`](crate::port::StreamSource))
//! - [`nsq`] - nsqd producer ([`Broker`](crate::port::Broker))
//! - [`sqlite`] - poll store ([`OptionProvider`](crate::port::OptionProvider))

pub mod nsq;
pub mod sqlite;
pub mod twitter;
