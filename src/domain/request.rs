//! Filter request sent when opening a stream.

use super::term::TrackedTerm;

/// Separator used to join terms into the `track` parameter.
pub const TRACK_SEPARATOR: &str = ",";

/// The filter a stream connection is opened with.
///
/// Built once per connection attempt from the option provider's current
/// terms. An empty term list is still a valid request (with an empty `track`
/// value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    terms: Vec<TrackedTerm>,
}

impl FilterRequest {
    pub fn new(terms: Vec<TrackedTerm>) -> Self {
        Self { terms }
    }

    #[must_use]
    pub fn terms(&self) -> &[TrackedTerm] {
        &self.terms
    }

    /// Value of the `track` form field: terms joined by [`TRACK_SEPARATOR`].
    #[must_use]
    pub fn track(&self) -> String {
        self.terms
            .iter()
            .map(TrackedTerm::as_str)
            .collect::<Vec<_>>()
            .join(TRACK_SEPARATOR)
    }
}
