//! Multi-field fetch selectors and results.

use super::{LogEntry, MatchMetadata, StateSnapshot};

/// Selects which of a match's documents a fetch should read.
///
/// All requested documents are read in a single atomic snapshot, so no field
/// reflects a partial concurrent write relative to the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchRequest {
    /// Fetch the metadata document.
    pub metadata: bool,
    /// Fetch the current state document.
    pub state: bool,
    /// Fetch the initial-state document.
    pub initial_state: bool,
    /// Fetch the log document.
    pub log: bool,
}

impl FetchRequest {
    /// Creates a request selecting nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            metadata: false,
            state: false,
            initial_state: false,
            log: false,
        }
    }

    /// Creates a request selecting all four documents.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            metadata: true,
            state: true,
            initial_state: true,
            log: true,
        }
    }

    /// Selects the metadata document.
    #[must_use]
    pub const fn metadata(mut self) -> Self {
        self.metadata = true;
        self
    }

    /// Selects the current state document.
    #[must_use]
    pub const fn state(mut self) -> Self {
        self.state = true;
        self
    }

    /// Selects the initial-state document.
    #[must_use]
    pub const fn initial_state(mut self) -> Self {
        self.initial_state = true;
        self
    }

    /// Selects the log document.
    #[must_use]
    pub const fn log(mut self) -> Self {
        self.log = true;
        self
    }

    /// True if no document is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.metadata && !self.state && !self.initial_state && !self.log
    }
}

/// Result of a multi-field fetch.
///
/// Documents that do not exist, including every document of an absent
/// match, are `None` rather than an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResult {
    /// The metadata document, with the derived completion flag stripped.
    pub metadata: Option<MatchMetadata>,
    /// The current state document.
    pub state: Option<StateSnapshot>,
    /// The initial-state document.
    pub initial_state: Option<StateSnapshot>,
    /// The log entries, unwrapped from their storage wrapper.
    pub log: Option<Vec<LogEntry>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_builders() {
        let request = FetchRequest::new().state().log();
        assert!(request.state && request.log);
        assert!(!request.metadata && !request.initial_state);
        assert!(!request.is_empty());
        assert!(FetchRequest::new().is_empty());
        assert_eq!(
            FetchRequest::all(),
            FetchRequest::new().metadata().state().initial_state().log()
        );
    }
}
