//! Outbound ports (driven side): interfaces implemented by outbound adapters.

pub mod broker;
pub mod options;
pub mod stream;
