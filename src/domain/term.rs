//! Tracked term identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A string identifying one filterable topic (a poll option).
///
/// Used both as the stream filter criterion and as the key reported when a
/// record mentions it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackedTerm(String);

impl TrackedTerm {
    /// Create a new `TrackedTerm` from a string.
    pub fn new(term: impl Into<String>) -> Self {
        Self(term.into())
    }

    /// Get the term as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackedTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TrackedTerm {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for TrackedTerm {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for TrackedTerm {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
