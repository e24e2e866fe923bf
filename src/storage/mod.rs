//! Storage layer.
//!
//! This module provides the persistence architecture:
//! - **Traits**: the narrow [`DocumentBackend`] capability interface
//! - **Backends**: concrete implementations (in-memory)
//! - **Planner**: splits listing filters between backend query clauses and
//!   in-process post-filtering
//! - **Store**: [`MatchStore`], the versioned record operations over a
//!   backend

pub mod match_store;
pub mod memory;
pub mod planner;
pub mod traits;

pub use match_store::MatchStore;
pub use memory::InMemoryBackend;
pub use planner::{PostFilter, QueryPlan};
pub use traits::{
    DocKind, DocumentBackend, MetadataQuery, NewMatchDocuments, StateTransaction, FIELD_GAME_NAME,
    FIELD_IS_GAMEOVER, FIELD_LOG_ENTRIES, FIELD_UPDATED_AT,
};
