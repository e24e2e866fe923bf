//! Document backend capability trait.

use crate::models::{LogEntry, MatchId};
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Metadata field holding the game name (equality-queryable).
pub const FIELD_GAME_NAME: &str = "game_name";
/// Metadata field holding the derived completion flag (equality-queryable).
pub const FIELD_IS_GAMEOVER: &str = "is_gameover";
/// Metadata field holding the last-update timestamp (range-queryable).
pub const FIELD_UPDATED_AT: &str = "updated_at";
/// Field of the log document wrapping the ordered entry array.
pub const FIELD_LOG_ENTRIES: &str = "entries";

/// The four document kinds that make up a stored match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocKind {
    /// Descriptive match metadata; the only queryable document.
    Metadata,
    /// Current versioned state snapshot.
    State,
    /// Immutable snapshot captured at match creation.
    InitialState,
    /// Append-only event log, stored behind an `entries` wrapper.
    Log,
}

impl DocKind {
    /// All document kinds, in canonical order.
    pub const ALL: [Self; 4] = [Self::Metadata, Self::State, Self::InitialState, Self::Log];

    /// Returns the kind as a collection-name suffix.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::State => "state",
            Self::InitialState => "initial_state",
            Self::Log => "log",
        }
    }
}

impl fmt::Display for DocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four documents written when a match is created.
///
/// Documents cross the backend boundary as opaque JSON values; encoding and
/// decoding live in the store layer.
#[derive(Debug, Clone)]
pub struct NewMatchDocuments {
    /// Stored metadata document (completion flag already derived).
    pub metadata: Value,
    /// Initial state document, doubling as the first current state.
    pub state: Value,
    /// Immutable copy of the initial state.
    pub initial_state: Value,
    /// Empty log wrapper.
    pub log: Value,
}

/// Server-side clauses of a metadata query.
///
/// Produced by the query planner; a backend receives only combinations it
/// can serve. Range bounds are strict comparisons on [`FIELD_UPDATED_AT`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataQuery {
    /// Equality clause on [`FIELD_GAME_NAME`].
    pub game_name: Option<String>,
    /// Equality clause on [`FIELD_IS_GAMEOVER`].
    pub is_gameover: Option<bool>,
    /// Exclusive lower bound on [`FIELD_UPDATED_AT`].
    pub updated_after: Option<u64>,
    /// Exclusive upper bound on [`FIELD_UPDATED_AT`].
    pub updated_before: Option<u64>,
}

impl MetadataQuery {
    /// Evaluates the clauses against a stored metadata document.
    ///
    /// Scan backends use this directly; indexed backends translate the
    /// clauses into their native query language instead.
    #[must_use]
    pub fn matches(&self, doc: &Value) -> bool {
        if let Some(game_name) = &self.game_name
            && doc.get(FIELD_GAME_NAME).and_then(Value::as_str) != Some(game_name.as_str())
        {
            return false;
        }
        if let Some(is_gameover) = self.is_gameover
            && doc.get(FIELD_IS_GAMEOVER).and_then(Value::as_bool) != Some(is_gameover)
        {
            return false;
        }
        if self.updated_after.is_some() || self.updated_before.is_some() {
            let Some(updated_at) = doc.get(FIELD_UPDATED_AT).and_then(Value::as_u64) else {
                return false;
            };
            if self.updated_after.is_some_and(|after| updated_at <= after) {
                return false;
            }
            if self.updated_before.is_some_and(|before| updated_at >= before) {
                return false;
            }
        }
        true
    }
}

/// An open read-then-conditional-write transaction over one match's state
/// and log.
///
/// The backend guarantees at least serializable isolation for the lifetime
/// of the transaction: between [`StateTransaction::prior_state`] and
/// [`StateTransaction::commit`], no concurrent state write for the same
/// match can interleave. Dropping a transaction without committing behaves
/// like [`StateTransaction::rollback`].
#[async_trait]
pub trait StateTransaction: Send {
    /// The state document as read when the transaction began, if any.
    fn prior_state(&self) -> Option<&Value>;

    /// Commits a new state document and appends `delta_log` entries to the
    /// log, as one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] if the backend fails to
    /// commit; the store is left at its prior state.
    async fn commit(self: Box<Self>, state: Value, delta_log: Vec<LogEntry>) -> Result<()>;

    /// Abandons the transaction without writing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] if releasing backend
    /// resources fails.
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Capability trait over the backing document store.
///
/// This is the narrow interface the store layer consumes: atomic
/// create/delete of a match's four documents, point operations on single
/// documents, a serializable state+log transaction, and a metadata query
/// with equality and range clauses. Implementations decide how collections
/// are namespaced (see `MatchstoreConfig::collection_prefix`).
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Atomically creates all four documents for a match.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AlreadyExists`] if any of the four documents
    /// is already present; no document is written in that case.
    async fn create_documents(&self, id: &MatchId, docs: NewMatchDocuments) -> Result<()>;

    /// Atomically deletes all four documents for a match.
    ///
    /// Deleting a match with no documents is a success.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] on backend failure.
    async fn delete_documents(&self, id: &MatchId) -> Result<()>;

    /// Unconditionally overwrites a single document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] on backend failure.
    async fn put_document(&self, id: &MatchId, kind: DocKind, doc: Value) -> Result<()>;

    /// Checks whether a single document exists.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] on backend failure.
    async fn contains_document(&self, id: &MatchId, kind: DocKind) -> Result<bool>;

    /// Reads several documents in one atomic snapshot.
    ///
    /// Absent documents are omitted from the result map.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] on backend failure.
    async fn read_documents(
        &self,
        id: &MatchId,
        kinds: &[DocKind],
    ) -> Result<HashMap<DocKind, Value>>;

    /// Begins a serializable read-then-conditional-write transaction over
    /// the match's state and log documents.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] if the transaction cannot
    /// be opened.
    async fn begin_state_update(&self, id: &MatchId) -> Result<Box<dyn StateTransaction>>;

    /// Runs a metadata query and returns `(id, metadata document)` rows.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] on backend failure.
    async fn query_metadata(&self, query: &MetadataQuery) -> Result<Vec<(MatchId, Value)>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(game_name: &str, updated_at: u64, is_gameover: bool) -> Value {
        json!({
            FIELD_GAME_NAME: game_name,
            FIELD_UPDATED_AT: updated_at,
            FIELD_IS_GAMEOVER: is_gameover,
        })
    }

    #[test]
    fn test_doc_kind_strings() {
        let suffixes: Vec<&str> = DocKind::ALL.iter().map(DocKind::as_str).collect();
        assert_eq!(suffixes, ["metadata", "state", "initial_state", "log"]);
    }

    #[test]
    fn test_query_equality_clauses() {
        let query = MetadataQuery {
            game_name: Some("chess".to_string()),
            is_gameover: Some(false),
            ..MetadataQuery::default()
        };
        assert!(query.matches(&doc("chess", 10, false)));
        assert!(!query.matches(&doc("go", 10, false)));
        assert!(!query.matches(&doc("chess", 10, true)));
    }

    #[test]
    fn test_query_range_is_strict() {
        let query = MetadataQuery {
            updated_after: Some(10),
            updated_before: Some(20),
            ..MetadataQuery::default()
        };
        assert!(!query.matches(&doc("chess", 10, false)));
        assert!(query.matches(&doc("chess", 11, false)));
        assert!(query.matches(&doc("chess", 19, false)));
        assert!(!query.matches(&doc("chess", 20, false)));
    }

    #[test]
    fn test_query_range_requires_timestamp_field() {
        let query = MetadataQuery {
            updated_after: Some(10),
            ..MetadataQuery::default()
        };
        assert!(!query.matches(&json!({FIELD_GAME_NAME: "chess"})));
    }

    #[test]
    fn test_empty_query_matches_all() {
        assert!(MetadataQuery::default().matches(&doc("chess", 1, true)));
        assert!(MetadataQuery::default().matches(&json!({})));
    }
}
