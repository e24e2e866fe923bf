//! Listing filters for match metadata.

/// Filter criteria for listing matches.
///
/// All predicates are optional and combine with AND. Range bounds are strict
/// (`updated_at > updated_after`, `updated_at < updated_before`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchFilter {
    /// Equality filter on the game name.
    pub game_name: Option<String>,
    /// Equality filter on the derived completion flag.
    pub is_gameover: Option<bool>,
    /// Lower bound (exclusive) on the last-update timestamp.
    pub updated_after: Option<u64>,
    /// Upper bound (exclusive) on the last-update timestamp.
    pub updated_before: Option<u64>,
}

impl MatchFilter {
    /// Creates an empty filter (matches all).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            game_name: None,
            is_gameover: None,
            updated_after: None,
            updated_before: None,
        }
    }

    /// Adds a game-name equality filter.
    #[must_use]
    pub fn with_game_name(mut self, game_name: impl Into<String>) -> Self {
        self.game_name = Some(game_name.into());
        self
    }

    /// Adds a completion-flag equality filter.
    #[must_use]
    pub const fn with_gameover(mut self, is_gameover: bool) -> Self {
        self.is_gameover = Some(is_gameover);
        self
    }

    /// Adds an exclusive lower bound on the last-update timestamp.
    #[must_use]
    pub const fn updated_after(mut self, timestamp: u64) -> Self {
        self.updated_after = Some(timestamp);
        self
    }

    /// Adds an exclusive upper bound on the last-update timestamp.
    #[must_use]
    pub const fn updated_before(mut self, timestamp: u64) -> Self {
        self.updated_before = Some(timestamp);
        self
    }

    /// True if a range bound on the last-update timestamp is present.
    #[must_use]
    pub const fn has_range(&self) -> bool {
        self.updated_after.is_some() || self.updated_before.is_some()
    }

    /// True if any equality predicate is present.
    #[must_use]
    pub const fn has_equality(&self) -> bool {
        self.game_name.is_some() || self.is_gameover.is_some()
    }

    /// True if no predicate is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.has_range() && !self.has_equality()
    }
}
