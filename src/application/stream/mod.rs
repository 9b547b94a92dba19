//! Reading the filtered stream and turning records into match events.

pub mod decoder;
pub mod reader;

pub use decoder::RecordDecoder;
pub use reader::{AttemptReport, StreamEnd, StreamReader};
