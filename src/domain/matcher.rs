//! The match rule: case-insensitive substring containment.

use super::record::StreamRecord;
use super::term::TrackedTerm;
use super::vote::MatchEvent;

/// Matches record text against a fixed set of tracked terms.
///
/// The term set is captured once per connection attempt and never changes
/// for the matcher's lifetime. Lowercased forms are computed up front so each
/// record costs one lowercase pass over its own text.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    terms: Vec<(TrackedTerm, String)>,
}

impl TermMatcher {
    pub fn new(terms: &[TrackedTerm]) -> Self {
        let terms = terms
            .iter()
            .map(|term| (term.clone(), term.as_str().to_lowercase()))
            .collect();
        Self { terms }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Every term contained in `text`, in tracked-term order.
    ///
    /// A term that appears several times in one text is reported once.
    pub fn matches<'a>(&'a self, text: &str) -> impl Iterator<Item = &'a TrackedTerm> + 'a {
        let lowered = text.to_lowercase();
        self.terms
            .iter()
            .filter(move |(_, needle)| lowered.contains(needle.as_str()))
            .map(|(term, _)| term)
    }

    /// Match events for one record, in tracked-term order.
    pub fn match_record(&self, record: &StreamRecord) -> Vec<MatchEvent> {
        self.matches(&record.text)
            .cloned()
            .map(MatchEvent::new)
            .collect()
    }
}
