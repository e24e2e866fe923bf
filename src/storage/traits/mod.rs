//! Backend capability traits.

mod document;

pub use document::{
    DocKind, DocumentBackend, MetadataQuery, NewMatchDocuments, StateTransaction, FIELD_GAME_NAME,
    FIELD_IS_GAMEOVER, FIELD_LOG_ENTRIES, FIELD_UPDATED_AT,
};
