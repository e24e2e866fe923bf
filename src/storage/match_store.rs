//! Versioned match record store.
//!
//! CRUD and transactional operations over one match's four documents,
//! delegating storage to a [`DocumentBackend`] and keeping every
//! encode/decode between model types and stored documents in this layer.

use crate::config::MatchstoreConfig;
use crate::models::{
    FetchRequest, FetchResult, LogEntry, MatchFilter, MatchId, MatchMetadata, StateSnapshot,
    StoredMatchMetadata,
};
use crate::storage::planner::QueryPlan;
use crate::storage::traits::{
    DocKind, DocumentBackend, NewMatchDocuments, FIELD_LOG_ENTRIES,
};
use crate::{Error, Result};
use serde_json::{json, Value};
use tracing::debug;

/// Store for versioned match records.
///
/// Writes to the current state are version-guarded: a write is accepted only
/// when its version is strictly greater than the stored one, decided inside
/// one serializable backend transaction so concurrent writers cannot both
/// observe the same prior version. Rejected writes, including their log
/// deltas, are defined no-ops.
#[derive(Debug, Clone)]
pub struct MatchStore<B> {
    backend: B,
    use_composite_indexes: bool,
}

impl<B: DocumentBackend> MatchStore<B> {
    /// Creates a store over the given backend.
    pub fn new(backend: B, config: &MatchstoreConfig) -> Self {
        Self {
            backend,
            use_composite_indexes: config.use_composite_indexes,
        }
    }

    /// Returns a reference to the backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Creates a match: metadata, the initial state (stored both as the
    /// immutable initial snapshot and as the first current state), and an
    /// empty log, written as one atomic unit.
    ///
    /// Strict-create semantics: creation fails if any of the four documents
    /// already exists, and writes nothing in that case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] for an occupied id, or
    /// [`Error::StoreUnavailable`] on backend failure.
    pub async fn create_match(
        &self,
        id: &MatchId,
        metadata: MatchMetadata,
        initial_state: &StateSnapshot,
    ) -> Result<()> {
        let metadata_doc = encode(id, DocKind::Metadata, &StoredMatchMetadata::from(metadata))?;
        let state_doc = encode(id, DocKind::State, initial_state)?;
        let docs = NewMatchDocuments {
            metadata: metadata_doc,
            initial_state: state_doc.clone(),
            state: state_doc,
            log: json!({ FIELD_LOG_ENTRIES: [] }),
        };
        self.backend.create_documents(id, docs).await?;
        debug!(match_id = %id, "Created match");
        Ok(())
    }

    /// Proposes a new current state, appending `delta_log` entries when the
    /// write is accepted.
    ///
    /// The stored version is read and compared inside one serializable
    /// backend transaction. The write is accepted iff no prior state exists
    /// or the prior version is strictly less than `state.version`; otherwise
    /// the entire operation (state and log) is a no-op. Callers that need to
    /// distinguish the no-op re-read afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] if the stored state has no
    /// readable version, or [`Error::StoreUnavailable`] on backend failure.
    pub async fn set_state(
        &self,
        id: &MatchId,
        state: &StateSnapshot,
        delta_log: Vec<LogEntry>,
    ) -> Result<()> {
        let txn = self.backend.begin_state_update(id).await?;
        let prior_version = match txn.prior_state() {
            Some(doc) => Some(doc.get("version").and_then(Value::as_u64).ok_or_else(|| {
                Error::InvalidDocument {
                    kind: DocKind::State.to_string(),
                    id: id.to_string(),
                    cause: "missing version".to_string(),
                }
            })?),
            None => None,
        };

        let accepted = prior_version.is_none_or(|prior| prior < state.version);
        if accepted {
            let doc = encode(id, DocKind::State, state)?;
            txn.commit(doc, delta_log).await?;
            debug!(match_id = %id, version = state.version, "Accepted state write");
        } else {
            txn.rollback().await?;
            debug!(
                match_id = %id,
                version = state.version,
                prior = prior_version.unwrap_or_default(),
                "Dropped stale state write"
            );
        }
        Ok(())
    }

    /// Unconditionally overwrites the metadata document, recomputing the
    /// derived completion flag. State, initial state, and log are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] on backend failure.
    pub async fn set_metadata(&self, id: &MatchId, metadata: MatchMetadata) -> Result<()> {
        let doc = encode(id, DocKind::Metadata, &StoredMatchMetadata::from(metadata))?;
        self.backend.put_document(id, DocKind::Metadata, doc).await
    }

    /// Fetches the requested documents in one atomic snapshot.
    ///
    /// Absent documents, and every document of an absent match, are
    /// omitted from the result rather than erroring. Metadata comes back
    /// with the derived flag stripped; the log comes back as its unwrapped
    /// entry array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] if a stored document fails to
    /// decode, or [`Error::StoreUnavailable`] on backend failure.
    pub async fn fetch(&self, id: &MatchId, request: FetchRequest) -> Result<FetchResult> {
        let mut result = FetchResult::default();
        if request.is_empty() {
            return Ok(result);
        }

        let mut kinds = Vec::with_capacity(4);
        if request.metadata {
            kinds.push(DocKind::Metadata);
        }
        if request.state {
            kinds.push(DocKind::State);
        }
        if request.initial_state {
            kinds.push(DocKind::InitialState);
        }
        if request.log {
            kinds.push(DocKind::Log);
        }

        let mut docs = self.backend.read_documents(id, &kinds).await?;
        if let Some(doc) = docs.remove(&DocKind::Metadata) {
            let stored: StoredMatchMetadata = decode(id, DocKind::Metadata, doc)?;
            result.metadata = Some(stored.into_metadata());
        }
        if let Some(doc) = docs.remove(&DocKind::State) {
            result.state = Some(decode(id, DocKind::State, doc)?);
        }
        if let Some(doc) = docs.remove(&DocKind::InitialState) {
            result.initial_state = Some(decode(id, DocKind::InitialState, doc)?);
        }
        if let Some(mut doc) = docs.remove(&DocKind::Log) {
            let entries = doc
                .get_mut(FIELD_LOG_ENTRIES)
                .map(Value::take)
                .and_then(|entries| match entries {
                    Value::Array(entries) => Some(entries),
                    _ => None,
                })
                .ok_or_else(|| Error::InvalidDocument {
                    kind: DocKind::Log.to_string(),
                    id: id.to_string(),
                    cause: format!("missing '{FIELD_LOG_ENTRIES}' array"),
                })?;
            result.log = Some(entries);
        }
        Ok(result)
    }

    /// Atomically deletes all four documents. Deleting an absent match is a
    /// silent success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] on backend failure.
    pub async fn wipe(&self, id: &MatchId) -> Result<()> {
        self.backend.delete_documents(id).await?;
        debug!(match_id = %id, "Wiped match");
        Ok(())
    }

    /// Checks whether the match exists, defined over the state document:
    /// the one every write path touches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] on backend failure.
    pub async fn match_exists(&self, id: &MatchId) -> Result<bool> {
        self.backend.contains_document(id, DocKind::State).await
    }

    /// Lists ids of matches satisfying the filter, in no particular order.
    ///
    /// The filter is split by the query planner: range bounds go to the
    /// backend, equality predicates go to the backend only when composite
    /// indexes are declared (or no range is present) and are otherwise
    /// applied here, over the backend's result rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`] if the filter cannot be planned, or
    /// [`Error::StoreUnavailable`] on backend failure.
    pub async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<MatchId>> {
        let plan = QueryPlan::build(filter, self.use_composite_indexes)?;
        let rows = self.backend.query_metadata(&plan.query).await?;
        let total = rows.len();
        let ids: Vec<MatchId> = rows
            .into_iter()
            .filter(|(_, doc)| plan.post_filter.matches(doc))
            .map(|(id, _)| id)
            .collect();
        debug!(
            returned = ids.len(),
            scanned = total,
            post_filtered = !plan.post_filter.is_empty(),
            "Listed matches"
        );
        Ok(ids)
    }
}

/// Encodes a model into its stored document.
fn encode<T: serde::Serialize>(id: &MatchId, kind: DocKind, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::InvalidDocument {
        kind: kind.to_string(),
        id: id.to_string(),
        cause: e.to_string(),
    })
}

/// Decodes a stored document into its model.
fn decode<T: serde::de::DeserializeOwned>(id: &MatchId, kind: DocKind, doc: Value) -> Result<T> {
    serde_json::from_value(doc).map_err(|e| Error::InvalidDocument {
        kind: kind.to_string(),
        id: id.to_string(),
        cause: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryBackend;
    use serde_json::json;

    fn store() -> MatchStore<InMemoryBackend> {
        MatchStore::new(InMemoryBackend::new(), &MatchstoreConfig::default())
    }

    fn metadata(game_name: &str, updated_at: u64, gameover: Option<Value>) -> MatchMetadata {
        MatchMetadata {
            game_name: game_name.to_string(),
            created_at: updated_at,
            updated_at,
            gameover,
            extra: serde_json::Map::new(),
        }
    }

    fn snapshot(version: u64) -> StateSnapshot {
        StateSnapshot::new(version, json!({"turn": version}))
    }

    #[tokio::test]
    async fn test_create_then_fetch_all_fields() {
        let store = store();
        let id = MatchId::new("m1");
        store
            .create_match(&id, metadata("chess", 1000, None), &snapshot(0))
            .await
            .unwrap();

        let result = store.fetch(&id, FetchRequest::all()).await.unwrap();
        assert_eq!(result.metadata.unwrap(), metadata("chess", 1000, None));
        assert_eq!(result.state.unwrap(), snapshot(0));
        assert_eq!(result.initial_state.unwrap(), snapshot(0));
        assert_eq!(result.log.unwrap(), Vec::<LogEntry>::new());
    }

    #[tokio::test]
    async fn test_create_is_strict() {
        let store = store();
        let id = MatchId::new("m1");
        store
            .create_match(&id, metadata("chess", 1000, None), &snapshot(0))
            .await
            .unwrap();
        assert!(matches!(
            store
                .create_match(&id, metadata("chess", 1000, None), &snapshot(0))
                .await,
            Err(Error::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_missing_match_omits_fields() {
        let store = store();
        let result = store
            .fetch(&MatchId::new("nope"), FetchRequest::all())
            .await
            .unwrap();
        assert_eq!(result, FetchResult::default());
    }

    #[tokio::test]
    async fn test_fetch_empty_request_reads_nothing() {
        let store = store();
        let id = MatchId::new("m1");
        store
            .create_match(&id, metadata("chess", 1000, None), &snapshot(0))
            .await
            .unwrap();
        let result = store.fetch(&id, FetchRequest::new()).await.unwrap();
        assert_eq!(result, FetchResult::default());
    }

    #[tokio::test]
    async fn test_set_state_is_version_guarded() {
        let store = store();
        let id = MatchId::new("m1");
        store.set_state(&id, &snapshot(2), Vec::new()).await.unwrap();
        // Stale and equal versions are no-ops.
        store.set_state(&id, &snapshot(1), Vec::new()).await.unwrap();
        store.set_state(&id, &snapshot(2), Vec::new()).await.unwrap();
        let state = store
            .fetch(&id, FetchRequest::new().state())
            .await
            .unwrap()
            .state
            .unwrap();
        assert_eq!(state, snapshot(2));

        store.set_state(&id, &snapshot(3), Vec::new()).await.unwrap();
        let state = store
            .fetch(&id, FetchRequest::new().state())
            .await
            .unwrap()
            .state
            .unwrap();
        assert_eq!(state, snapshot(3));
    }

    #[tokio::test]
    async fn test_rejected_writes_do_not_append_log() {
        let store = store();
        let id = MatchId::new("m1");
        store
            .create_match(&id, metadata("chess", 1000, None), &snapshot(0))
            .await
            .unwrap();
        store
            .set_state(&id, &snapshot(1), vec![json!({"move": "e4"})])
            .await
            .unwrap();
        store
            .set_state(&id, &snapshot(1), vec![json!({"move": "bogus"})])
            .await
            .unwrap();
        store
            .set_state(&id, &snapshot(2), vec![json!({"move": "e5"})])
            .await
            .unwrap();

        let log = store
            .fetch(&id, FetchRequest::new().log())
            .await
            .unwrap()
            .log
            .unwrap();
        assert_eq!(log, vec![json!({"move": "e4"}), json!({"move": "e5"})]);
    }

    #[tokio::test]
    async fn test_set_metadata_overwrites_and_rederives_flag() {
        let store = store();
        let id = MatchId::new("m1");
        store
            .create_match(&id, metadata("chess", 1000, None), &snapshot(0))
            .await
            .unwrap();
        store
            .set_metadata(&id, metadata("chess", 2000, Some(json!({"winner": "0"}))))
            .await
            .unwrap();

        let fetched = store
            .fetch(&id, FetchRequest::new().metadata())
            .await
            .unwrap()
            .metadata
            .unwrap();
        assert_eq!(fetched.updated_at, 2000);
        assert_eq!(fetched.gameover, Some(json!({"winner": "0"})));
        // The stored flag tracked the rewrite.
        let ids = store
            .list_matches(&MatchFilter::new().with_gameover(true))
            .await
            .unwrap();
        assert_eq!(ids, vec![id]);
    }

    #[tokio::test]
    async fn test_wipe_is_idempotent() {
        let store = store();
        let id = MatchId::new("m1");
        store
            .create_match(&id, metadata("chess", 1000, None), &snapshot(0))
            .await
            .unwrap();
        assert!(store.match_exists(&id).await.unwrap());
        store.wipe(&id).await.unwrap();
        assert!(!store.match_exists(&id).await.unwrap());
        store.wipe(&id).await.unwrap();
        let result = store.fetch(&id, FetchRequest::all()).await.unwrap();
        assert_eq!(result, FetchResult::default());
    }
}
