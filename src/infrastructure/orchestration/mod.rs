//! Pipeline orchestration.
//!
//! Assembly of the reader, publisher, reaper and shutdown coordinator around
//! one connection manager, and the lifecycle that runs them.

pub mod pipeline;
mod runtime;

pub use pipeline::{Pipeline, PipelineSettings, MATCH_CHANNEL_CAPACITY};
