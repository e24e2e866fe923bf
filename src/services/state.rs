//! Coherent match-state access over the cache and the store.

use crate::cache::StateCache;
use crate::config::MatchstoreConfig;
use crate::models::{FetchRequest, MatchFilter, MatchId, StateSnapshot};
use crate::storage::{DocumentBackend, MatchStore};
use crate::Result;
use tracing::{debug, instrument};

/// Front door for match-state reads and writes.
///
/// Composes the bounded [`StateCache`] with a [`MatchStore`] and resolves
/// the coherence between them. The store is the system of record; the cache
/// is a latency optimization that must never show a caller a state older
/// than one it has already been shown. Two rules enforce that:
///
/// - **Writes** are version-guarded at both layers independently. The cache
///   drops a proposal whose version does not exceed the cached one; the
///   store re-checks inside its own transaction, since cache and store can
///   diverge under concurrent callers.
/// - **Reads** that fall through to the store re-validate against the cache
///   after the round-trip: a concurrent fresher write that landed in the
///   cache while the read was in flight must not be clobbered by the slower
///   fetch.
///
/// Wall-clock arrival order is never trusted; only versions are.
#[derive(Debug)]
pub struct StateService<B> {
    store: MatchStore<B>,
    cache: StateCache,
}

impl<B: DocumentBackend> StateService<B> {
    /// Creates a service over the given backend.
    pub fn new(backend: B, config: &MatchstoreConfig) -> Self {
        Self {
            store: MatchStore::new(backend, config),
            cache: StateCache::new(config.cache_capacity),
        }
    }

    /// Returns the underlying store, for operations that bypass the cache
    /// (match creation, metadata, multi-field fetches, filtered listing).
    pub const fn store(&self) -> &MatchStore<B> {
        &self.store
    }

    /// Returns the cache layer.
    pub const fn cache(&self) -> &StateCache {
        &self.cache
    }

    /// Proposes a new state for a match.
    ///
    /// If the cache already holds this match at an equal or higher version,
    /// the proposal is a silent no-op: out-of-order deliveries die here
    /// without a round-trip. Otherwise the cache is updated first, making
    /// the write locally visible, and then written through to the store,
    /// which applies its own version guard.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] on backend failure. The
    /// cache keeps the proposed state in that case; the store arbitrates on
    /// the next read-through.
    #[instrument(skip(self, state), fields(version = state.version))]
    pub async fn set(&self, id: &MatchId, state: StateSnapshot) -> Result<()> {
        if let Some(cached) = self.cache.get(id)
            && cached.version >= state.version
        {
            debug!(
                match_id = %id,
                cached = cached.version,
                proposed = state.version,
                "Dropped out-of-order state proposal"
            );
            return Ok(());
        }

        self.cache.put(id, state.clone());
        self.store.set_state(id, &state, Vec::new()).await
    }

    /// Reads the current state of a match.
    ///
    /// A cache hit is returned immediately; the cache is authoritative
    /// when present. On a miss the store is consulted; a snapshot found
    /// there populates the cache only if its version has not been overtaken
    /// by a concurrent write during the round-trip, and is returned to the
    /// caller either way. A missing match returns `None` and leaves the
    /// cache untouched.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] on backend failure.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &MatchId) -> Result<Option<StateSnapshot>> {
        if let Some(cached) = self.cache.get(id) {
            return Ok(Some(cached));
        }

        let fetched = self.store.fetch(id, FetchRequest::new().state()).await?;
        let Some(snapshot) = fetched.state else {
            return Ok(None);
        };

        // Re-validate right before mutating: a fresher write may have landed
        // in the cache while the store read was in flight.
        let observed = self.cache.get(id).map_or(0, |cached| cached.version);
        if snapshot.version >= observed {
            self.cache.put(id, snapshot.clone());
        } else {
            debug!(
                match_id = %id,
                fetched = snapshot.version,
                observed,
                "Skipped cache fill from stale store read"
            );
        }
        Ok(Some(snapshot))
    }

    /// Checks whether a match exists, preferring the cache.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] on backend failure.
    pub async fn has(&self, id: &MatchId) -> Result<bool> {
        if self.cache.get(id).is_some() {
            return Ok(true);
        }
        self.store.match_exists(id).await
    }

    /// Removes a match from the store and evicts its cache entry.
    ///
    /// Removing a match that does not exist is a silent success, so
    /// repeated calls are safe.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] on backend failure.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: &MatchId) -> Result<()> {
        if !self.has(id).await? {
            return Ok(());
        }
        self.store.wipe(id).await?;
        self.cache.remove(id);
        Ok(())
    }

    /// Lists all match ids. Listing never involves the cache.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] on backend failure.
    pub async fn list(&self) -> Result<Vec<MatchId>> {
        self.store.list_matches(&MatchFilter::new()).await
    }
}
