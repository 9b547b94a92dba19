//! Match events handed from the reader to the publisher.

use std::fmt;

use super::term::TrackedTerm;

/// A tracked term that was found inside a record's text.
///
/// Produced once per matching (record, term) pair and consumed exactly once
/// by the publisher. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEvent {
    term: TrackedTerm,
}

impl MatchEvent {
    pub fn new(term: TrackedTerm) -> Self {
        Self { term }
    }

    #[must_use]
    pub fn term(&self) -> &TrackedTerm {
        &self.term
    }

    /// Broker payload: the term's UTF-8 bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        self.term.as_str().as_bytes()
    }
}

impl fmt::Display for MatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.term)
    }
}

impl From<TrackedTerm> for MatchEvent {
    fn from(term: TrackedTerm) -> Self {
        Self::new(term)
    }
}
