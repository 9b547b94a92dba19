//! NSQ producer adapter.
//!
//! A minimal nsqd TCP client: V2 magic, `PUB`, response frames and
//! heartbeats. Nothing else of the protocol is needed to publish votes.

pub mod producer;
pub mod protocol;

pub use producer::NsqProducer;
