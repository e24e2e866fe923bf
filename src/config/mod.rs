//! Configuration management.

use std::num::NonZeroUsize;

/// Default collection name prefix for backing-store namespacing.
pub const DEFAULT_COLLECTION_PREFIX: &str = "match_";

/// Default capacity of the in-process state cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Main configuration for matchstore.
///
/// Capability negotiation is configuration-time: whether the backend can
/// combine range and equality clauses in one query is declared here, never
/// probed at runtime.
#[derive(Debug, Clone)]
pub struct MatchstoreConfig {
    /// Prefix applied to backing-store collection names, one collection per
    /// document kind (e.g. `match_metadata`, `match_state`).
    pub collection_prefix: String,
    /// Capacity of the in-process state cache. Zero disables caching
    /// entirely: every read and write goes straight to the store.
    pub cache_capacity: usize,
    /// Whether the backend can serve compound range+equality metadata
    /// queries. When false, equality predicates accompanying a range filter
    /// are applied in-process instead.
    pub use_composite_indexes: bool,
}

impl Default for MatchstoreConfig {
    fn default() -> Self {
        Self {
            collection_prefix: DEFAULT_COLLECTION_PREFIX.to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            use_composite_indexes: false,
        }
    }
}

impl MatchstoreConfig {
    /// Sets the collection name prefix.
    #[must_use]
    pub fn with_collection_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.collection_prefix = prefix.into();
        self
    }

    /// Sets the cache capacity. Zero disables caching.
    #[must_use]
    pub const fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Declares compound range+equality query support on the backend.
    #[must_use]
    pub const fn with_composite_indexes(mut self, enabled: bool) -> Self {
        self.use_composite_indexes = enabled;
        self
    }

    /// Returns the cache capacity as a `NonZeroUsize`, or `None` when
    /// caching is disabled.
    #[must_use]
    pub const fn cache_capacity_nonzero(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.cache_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatchstoreConfig::default();
        assert_eq!(config.collection_prefix, "match_");
        assert_eq!(config.cache_capacity, 1000);
        assert!(!config.use_composite_indexes);
    }

    #[test]
    fn test_builder_methods() {
        let config = MatchstoreConfig::default()
            .with_collection_prefix("g_")
            .with_cache_capacity(0)
            .with_composite_indexes(true);
        assert_eq!(config.collection_prefix, "g_");
        assert!(config.cache_capacity_nonzero().is_none());
        assert!(config.use_composite_indexes);
    }
}
