//! Stream-agnostic domain types.
//!
//! Nothing in here performs I/O. The types describe what flows through the
//! pipeline: the terms being tracked, the records read off the stream, the
//! matches handed to the publisher, and the match rule that connects them.

pub mod matcher;
pub mod record;
pub mod request;
pub mod term;
pub mod vote;

pub use matcher::TermMatcher;
pub use record::StreamRecord;
pub use request::FilterRequest;
pub use term::TrackedTerm;
pub use vote::MatchEvent;
