//! Bounded in-process cache for match state.

use crate::models::{MatchId, StateSnapshot};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Bounded LRU cache mapping match id to the last-known state snapshot.
///
/// The cache is a latency optimization in front of the backing store, never
/// a source of truth: entries carry the snapshot's version so the service
/// layer can refuse to regress an entry to older data.
///
/// A capacity of zero disables the cache entirely: every `get` is a miss
/// and every `put` is dropped, which turns the service layer into a pure
/// store pass-through.
///
/// # Thread Safety
///
/// Uses a `Mutex` for interior mutability; `get` takes the lock too because
/// an LRU read refreshes recency. Safe to share across async tasks; no
/// operation suspends while holding the lock.
///
/// # Lock Poisoning
///
/// Handled with fail-open semantics: a poisoned lock degrades the cache to
/// permanent misses instead of panicking. The store remains the system of
/// record, so a lost cache only costs round-trips.
#[derive(Debug)]
pub struct StateCache {
    /// `None` when constructed with zero capacity.
    entries: Option<Mutex<LruCache<MatchId, StateSnapshot>>>,
}

impl StateCache {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// Zero capacity yields a disabled cache.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    /// Returns the cached snapshot for a match, refreshing its recency.
    #[must_use]
    pub fn get(&self, id: &MatchId) -> Option<StateSnapshot> {
        let entries = self.entries.as_ref()?;
        let mut entries = entries.lock().ok()?;
        entries.get(id).cloned()
    }

    /// Inserts or replaces the cached snapshot for a match, evicting the
    /// least recently used entry at capacity.
    pub fn put(&self, id: &MatchId, snapshot: StateSnapshot) {
        if let Some(entries) = &self.entries
            && let Ok(mut entries) = entries.lock()
        {
            entries.put(id.clone(), snapshot);
        }
    }

    /// Removes the cached snapshot for a match, if present.
    pub fn remove(&self, id: &MatchId) {
        if let Some(entries) = &self.entries
            && let Ok(mut entries) = entries.lock()
        {
            entries.pop(id);
        }
    }

    /// Removes all entries.
    pub fn clear(&self) {
        if let Some(entries) = &self.entries
            && let Ok(mut entries) = entries.lock()
        {
            entries.clear();
        }
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .as_ref()
            .and_then(|entries| entries.lock().ok().map(|entries| entries.len()))
            .unwrap_or(0)
    }

    /// True if the cache holds no entries (including when disabled).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached match ids, most recently used first.
    #[must_use]
    pub fn keys(&self) -> Vec<MatchId> {
        self.entries
            .as_ref()
            .and_then(|entries| {
                entries
                    .lock()
                    .ok()
                    .map(|entries| entries.iter().map(|(id, _)| id.clone()).collect())
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(version: u64) -> StateSnapshot {
        StateSnapshot::new(version, json!({}))
    }

    #[test]
    fn test_get_put_remove() {
        let cache = StateCache::new(8);
        let id = MatchId::new("m1");
        assert!(cache.get(&id).is_none());
        cache.put(&id, snapshot(1));
        assert_eq!(cache.get(&id).unwrap().version, 1);
        cache.remove(&id);
        assert!(cache.get(&id).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_one_keeps_most_recent_write() {
        let cache = StateCache::new(1);
        cache.put(&MatchId::new("m1"), snapshot(1));
        cache.put(&MatchId::new("m2"), snapshot(1));
        assert_eq!(cache.keys(), vec![MatchId::new("m2")]);
        assert!(cache.get(&MatchId::new("m1")).is_none());
    }

    #[test]
    fn test_get_refreshes_recency() {
        let cache = StateCache::new(2);
        cache.put(&MatchId::new("m1"), snapshot(1));
        cache.put(&MatchId::new("m2"), snapshot(1));
        // Touch m1 so m2 becomes the eviction candidate.
        let _ = cache.get(&MatchId::new("m1"));
        cache.put(&MatchId::new("m3"), snapshot(1));
        assert!(cache.get(&MatchId::new("m1")).is_some());
        assert!(cache.get(&MatchId::new("m2")).is_none());
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cache = StateCache::new(0);
        let id = MatchId::new("m1");
        cache.put(&id, snapshot(1));
        assert!(cache.get(&id).is_none());
        assert_eq!(cache.len(), 0);
        assert!(cache.keys().is_empty());
        // No-ops, not panics.
        cache.remove(&id);
        cache.clear();
    }

    #[test]
    fn test_clear() {
        let cache = StateCache::new(4);
        cache.put(&MatchId::new("m1"), snapshot(1));
        cache.put(&MatchId::new("m2"), snapshot(2));
        cache.clear();
        assert!(cache.is_empty());
    }
}
