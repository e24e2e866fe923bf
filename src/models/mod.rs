//! Data models for matchstore.
//!
//! This module contains the core data structures used throughout the system.

mod fetch;
mod filter;
mod match_meta;
mod state;

pub use fetch::{FetchRequest, FetchResult};
pub use filter::MatchFilter;
pub use match_meta::{MatchId, MatchMetadata, StoredMatchMetadata};
pub use state::StateSnapshot;

/// An opaque match-log event record.
///
/// Log entries are ordered and append-only; matchstore never inspects or
/// rewrites them.
pub type LogEntry = serde_json::Value;
