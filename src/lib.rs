//! # Matchstore
//!
//! Versioned match-state persistence with a coherent in-process cache.
//!
//! Matchstore persists game-match records (state snapshots, append-only
//! logs, and match metadata) in a backing document store, and keeps a
//! bounded LRU cache in front of it so hot matches avoid a round-trip.
//! Concurrent, possibly out-of-order writes are reconciled with a monotonic
//! per-match version counter: the store and the cache each enforce the same
//! last-writer-wins-by-version rule, so neither layer can regress to a state
//! a caller has already been shown.
//!
//! ## Features
//!
//! - Four-document match records (metadata, state, initial state, log)
//!   created and destroyed atomically as a group
//! - Version-guarded state writes: stale writes are defined no-ops
//! - Bounded LRU cache with stale-read protection on the read path
//! - Metadata listing with a query planner that splits predicates between
//!   server-side clauses and in-process post-filtering, depending on whether
//!   the backend supports compound range+equality indexes
//! - Pluggable backends behind a narrow [`DocumentBackend`] capability trait,
//!   with a first-class in-memory implementation
//!
//! ## Example
//!
//! ```rust,ignore
//! use matchstore::{InMemoryBackend, MatchstoreConfig, StateService};
//!
//! let config = MatchstoreConfig::default();
//! let service = StateService::new(InMemoryBackend::new(), &config);
//! service.set(&"match-1".into(), snapshot).await?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cache;
pub mod config;
pub mod models;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use cache::StateCache;
pub use config::MatchstoreConfig;
pub use models::{
    FetchRequest, FetchResult, LogEntry, MatchFilter, MatchId, MatchMetadata, StateSnapshot,
};
pub use services::StateService;
pub use storage::{
    DocKind, DocumentBackend, InMemoryBackend, MatchStore, MetadataQuery, NewMatchDocuments,
    QueryPlan, StateTransaction,
};

/// Error type for matchstore operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `AlreadyExists` | `create_match` for an id that already has documents |
/// | `InvalidFilter` | A listing filter decomposes into an unplannable query |
/// | `InvalidDocument` | A stored document fails to decode into its model type |
/// | `StoreUnavailable` | The backend's transport or transaction layer fails |
///
/// Absence is not an error: reads of missing matches yield `None`/omitted
/// fields, and deleting a missing match is a silent success. A state write
/// that loses the version race is a defined no-op, not an error; callers
/// that care can re-read.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A match with this id already has stored documents.
    ///
    /// Raised when:
    /// - `create_match` is called for an id where any of the four documents
    ///   (metadata, state, initial state, log) is already present
    #[error("match '{0}' already exists")]
    AlreadyExists(String),

    /// A listing filter requested a predicate combination the planner could
    /// not place server-side or client-side.
    ///
    /// Defensive validation only; every combination expressible through
    /// [`MatchFilter`] has a plan.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// A stored document failed to decode into its expected shape.
    ///
    /// Raised when:
    /// - A state document has no readable `version` field
    /// - A metadata or log document does not match its stored schema
    #[error("invalid {kind} document for match '{id}': {cause}")]
    InvalidDocument {
        /// The document kind that failed to decode.
        kind: String,
        /// The match the document belongs to.
        id: String,
        /// The underlying decode error.
        cause: String,
    },

    /// The backing store failed at the transport or transaction layer.
    ///
    /// Raised when:
    /// - A backend read, write, or transaction times out or is cancelled
    /// - Connectivity or permission failures surface from the backend
    ///
    /// Never retried internally; retry policy belongs to the caller.
    #[error("store unavailable: operation '{operation}' failed: {cause}")]
    StoreUnavailable {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for matchstore operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in milliseconds.
///
/// Callers stamp `created_at`/`updated_at` on metadata themselves; this
/// helper exists so hosts that do not carry their own clock plumbing agree
/// on the epoch and unit. Falls back to 0 if the system clock is before the
/// Unix epoch.
///
/// # Examples
///
/// ```rust
/// use matchstore::current_timestamp_millis;
///
/// let ts = current_timestamp_millis();
/// assert!(ts > 0);
/// ```
#[must_use]
pub fn current_timestamp_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::AlreadyExists("m1".to_string());
        assert_eq!(err.to_string(), "match 'm1' already exists");

        let err = Error::StoreUnavailable {
            operation: "query_metadata".to_string(),
            cause: "connection reset".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "store unavailable: operation 'query_metadata' failed: connection reset"
        );

        let err = Error::InvalidDocument {
            kind: "state".to_string(),
            id: "m1".to_string(),
            cause: "missing version".to_string(),
        };
        assert!(err.to_string().contains("state"));
        assert!(err.to_string().contains("m1"));
    }

    #[test]
    fn test_current_timestamp_millis() {
        let ts = current_timestamp_millis();
        // 2020-01-01 in epoch milliseconds.
        assert!(ts > 1_577_836_800_000);
    }
}
