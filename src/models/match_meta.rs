//! Match identifiers and metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Unique identifier for a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    /// Creates a new match ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MatchId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Descriptive metadata for a match.
///
/// This is the only document the listing queries run over. Timestamps are
/// caller-supplied epoch milliseconds; matchstore never stamps them itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    /// Name of the game this match belongs to.
    pub game_name: String,
    /// Creation timestamp (epoch milliseconds).
    pub created_at: u64,
    /// Last update timestamp (epoch milliseconds).
    pub updated_at: u64,
    /// Domain-level game-over value, if the match has concluded.
    ///
    /// Any present value counts as concluded, including `false`-y ones;
    /// matchstore derives the queryable completion flag from presence alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gameover: Option<Value>,
    /// Arbitrary extension fields, persisted verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stored form of [`MatchMetadata`], augmented with the derived completion
/// flag the listing queries filter on.
///
/// The flag is recomputed on every write and stripped from every read, so
/// callers only ever see [`MatchMetadata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMatchMetadata {
    /// Derived completion flag: true iff `gameover` is present.
    pub is_gameover: bool,
    /// The caller-visible metadata.
    #[serde(flatten)]
    pub metadata: MatchMetadata,
}

impl StoredMatchMetadata {
    /// Augments metadata with the derived completion flag.
    #[must_use]
    pub fn from_metadata(metadata: MatchMetadata) -> Self {
        Self {
            is_gameover: metadata.gameover.is_some(),
            metadata,
        }
    }

    /// Strips the derived flag, returning the caller-visible metadata.
    #[must_use]
    pub fn into_metadata(self) -> MatchMetadata {
        self.metadata
    }
}

impl From<MatchMetadata> for StoredMatchMetadata {
    fn from(metadata: MatchMetadata) -> Self {
        Self::from_metadata(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(gameover: Option<Value>) -> MatchMetadata {
        MatchMetadata {
            game_name: "chess".to_string(),
            created_at: 1000,
            updated_at: 2000,
            gameover,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_match_id_preserves_string() {
        let id = MatchId::new("m-1");
        assert_eq!(id.as_str(), "m-1");
        assert_eq!(id.to_string(), "m-1");
        assert_eq!(MatchId::from("m-1"), MatchId::from("m-1".to_string()));
    }

    #[test]
    fn test_derived_flag_from_presence() {
        assert!(!StoredMatchMetadata::from_metadata(meta(None)).is_gameover);
        // Presence counts, truthiness does not.
        assert!(StoredMatchMetadata::from_metadata(meta(Some(json!(false)))).is_gameover);
        assert!(StoredMatchMetadata::from_metadata(meta(Some(json!("0")))).is_gameover);
        assert!(StoredMatchMetadata::from_metadata(meta(Some(json!({"winner": "0"})))).is_gameover);
    }

    #[test]
    fn test_stored_form_strips_flag_on_decode() {
        let stored = StoredMatchMetadata::from_metadata(meta(Some(json!(true))));
        let doc = serde_json::to_value(&stored).unwrap();
        assert_eq!(doc["is_gameover"], json!(true));
        assert_eq!(doc["game_name"], json!("chess"));

        let back: StoredMatchMetadata = serde_json::from_value(doc).unwrap();
        let visible = back.into_metadata();
        assert_eq!(visible, meta(Some(json!(true))));
        // The derived flag must not leak into the extension map.
        assert!(!visible.extra.contains_key("is_gameover"));
    }

    #[test]
    fn test_extension_fields_roundtrip() {
        let mut m = meta(None);
        m.extra.insert("players".to_string(), json!(["0", "1"]));
        let doc = serde_json::to_value(StoredMatchMetadata::from_metadata(m.clone())).unwrap();
        assert_eq!(doc["players"], json!(["0", "1"]));
        let back: StoredMatchMetadata = serde_json::from_value(doc).unwrap();
        assert_eq!(back.into_metadata(), m);
    }
}
