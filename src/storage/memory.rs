//! In-memory document backend.
//!
//! A fast, non-persistent implementation of [`DocumentBackend`] for unit
//! tests, contract tests, and embedded single-process deployments. One
//! `tokio` mutex guards all four tables, which makes every multi-document
//! operation trivially atomic and gives state transactions serializable
//! isolation: the transaction holds the store lock from open to commit.

use crate::models::{LogEntry, MatchId};
use crate::storage::traits::{
    DocKind, DocumentBackend, MetadataQuery, NewMatchDocuments, StateTransaction,
    FIELD_LOG_ENTRIES,
};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One table per document kind.
#[derive(Debug, Default)]
struct Tables {
    metadata: HashMap<MatchId, Value>,
    state: HashMap<MatchId, Value>,
    initial_state: HashMap<MatchId, Value>,
    log: HashMap<MatchId, Value>,
}

impl Tables {
    fn table(&self, kind: DocKind) -> &HashMap<MatchId, Value> {
        match kind {
            DocKind::Metadata => &self.metadata,
            DocKind::State => &self.state,
            DocKind::InitialState => &self.initial_state,
            DocKind::Log => &self.log,
        }
    }

    fn table_mut(&mut self, kind: DocKind) -> &mut HashMap<MatchId, Value> {
        match kind {
            DocKind::Metadata => &mut self.metadata,
            DocKind::State => &mut self.state,
            DocKind::InitialState => &mut self.initial_state,
            DocKind::Log => &mut self.log,
        }
    }
}

/// In-memory document backend.
///
/// Data is not persisted between runs. Cloning shares the underlying
/// tables, so a clone can stand in for a second connection to the same
/// store.
///
/// # Example
///
/// ```rust,ignore
/// use matchstore::{InMemoryBackend, MatchstoreConfig, StateService};
///
/// let service = StateService::new(InMemoryBackend::new(), &MatchstoreConfig::default());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// State transaction holding the store lock until commit or rollback.
struct InMemoryStateTransaction {
    guard: OwnedMutexGuard<Tables>,
    id: MatchId,
    prior: Option<Value>,
}

#[async_trait]
impl StateTransaction for InMemoryStateTransaction {
    fn prior_state(&self) -> Option<&Value> {
        self.prior.as_ref()
    }

    async fn commit(mut self: Box<Self>, state: Value, delta_log: Vec<LogEntry>) -> Result<()> {
        self.guard.state.insert(self.id.clone(), state);
        if delta_log.is_empty() {
            return Ok(());
        }
        // The log wrapper is created on demand so state-first matches still
        // accumulate entries.
        let wrapper = self
            .guard
            .log
            .entry(self.id.clone())
            .or_insert_with(|| json!({ FIELD_LOG_ENTRIES: [] }));
        let entries = wrapper
            .get_mut(FIELD_LOG_ENTRIES)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| Error::InvalidDocument {
                kind: DocKind::Log.to_string(),
                id: self.id.to_string(),
                cause: format!("missing '{FIELD_LOG_ENTRIES}' array"),
            })?;
        entries.extend(delta_log);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        // Dropping the guard releases the store lock with nothing written.
        Ok(())
    }
}

#[async_trait]
impl DocumentBackend for InMemoryBackend {
    async fn create_documents(&self, id: &MatchId, docs: NewMatchDocuments) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let occupied = DocKind::ALL
            .iter()
            .any(|kind| tables.table(*kind).contains_key(id));
        if occupied {
            return Err(Error::AlreadyExists(id.to_string()));
        }
        tables.metadata.insert(id.clone(), docs.metadata);
        tables.state.insert(id.clone(), docs.state);
        tables.initial_state.insert(id.clone(), docs.initial_state);
        tables.log.insert(id.clone(), docs.log);
        Ok(())
    }

    async fn delete_documents(&self, id: &MatchId) -> Result<()> {
        let mut tables = self.tables.lock().await;
        for kind in DocKind::ALL {
            tables.table_mut(kind).remove(id);
        }
        Ok(())
    }

    async fn put_document(&self, id: &MatchId, kind: DocKind, doc: Value) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.table_mut(kind).insert(id.clone(), doc);
        Ok(())
    }

    async fn contains_document(&self, id: &MatchId, kind: DocKind) -> Result<bool> {
        let tables = self.tables.lock().await;
        Ok(tables.table(kind).contains_key(id))
    }

    async fn read_documents(
        &self,
        id: &MatchId,
        kinds: &[DocKind],
    ) -> Result<HashMap<DocKind, Value>> {
        let tables = self.tables.lock().await;
        let mut result = HashMap::with_capacity(kinds.len());
        for kind in kinds {
            if let Some(doc) = tables.table(*kind).get(id) {
                result.insert(*kind, doc.clone());
            }
        }
        Ok(result)
    }

    async fn begin_state_update(&self, id: &MatchId) -> Result<Box<dyn StateTransaction>> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let prior = guard.state.get(id).cloned();
        Ok(Box::new(InMemoryStateTransaction {
            guard,
            id: id.clone(),
            prior,
        }))
    }

    async fn query_metadata(&self, query: &MetadataQuery) -> Result<Vec<(MatchId, Value)>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .metadata
            .iter()
            .filter(|(_, doc)| query.matches(doc))
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect())
    }
}
