//! Match state snapshots.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A versioned snapshot of a match's mutable state.
///
/// The `version` counter is the sole conflict-resolution signal: a write is
/// accepted only when its version is strictly greater than the stored one,
/// and the cache never replaces an entry with a lower-versioned snapshot.
/// The payload is otherwise opaque to matchstore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Monotonic version counter, strictly increasing across accepted writes.
    pub version: u64,
    /// Opaque engine state.
    pub data: Value,
}

impl StateSnapshot {
    /// Creates a snapshot from a version counter and an opaque payload.
    #[must_use]
    pub const fn new(version: u64, data: Value) -> Self {
        Self { version, data }
    }
}
