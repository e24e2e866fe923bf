//! Query planning for match listings.
//!
//! Document stores index equality and range predicates asymmetrically: a
//! single-field range query is always cheap, but combining it with equality
//! clauses needs a pre-declared compound index. The planner splits a
//! [`MatchFilter`] into clauses pushed to the backend and predicates applied
//! in-process, so no requested predicate is ever silently dropped.

use crate::models::MatchFilter;
use crate::storage::traits::{MetadataQuery, FIELD_GAME_NAME, FIELD_IS_GAMEOVER};
use crate::{Error, Result};
use serde_json::Value;

/// Equality predicates evaluated in-process over the backend's result rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Game-name equality to enforce client-side.
    pub game_name: Option<String>,
    /// Completion-flag equality to enforce client-side.
    pub is_gameover: Option<bool>,
}

impl PostFilter {
    /// True if no predicate needs in-process evaluation.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.game_name.is_none() && self.is_gameover.is_none()
    }

    /// Evaluates the predicates against a stored metadata document.
    #[must_use]
    pub fn matches(&self, doc: &Value) -> bool {
        if let Some(game_name) = &self.game_name
            && doc.get(FIELD_GAME_NAME).and_then(Value::as_str) != Some(game_name.as_str())
        {
            return false;
        }
        if let Some(is_gameover) = self.is_gameover
            && doc.get(FIELD_IS_GAMEOVER).and_then(Value::as_bool) != Some(is_gameover)
        {
            return false;
        }
        true
    }
}

/// A planned match listing: server-side clauses plus the in-process
/// remainder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
    /// Clauses pushed to the backend.
    pub query: MetadataQuery,
    /// Predicates the store applies to the returned rows.
    pub post_filter: PostFilter,
}

impl QueryPlan {
    /// Splits a filter into server-side clauses and an in-process remainder.
    ///
    /// Range bounds are always pushed. Equality predicates are pushed when
    /// no range bound is present, or when `use_composite_indexes` declares
    /// the backend can combine them with one; otherwise they fold into the
    /// post-filter. Rows outside a pushed range are never reconsidered, even
    /// where folded equality predicates would have matched them; the range
    /// restricts the candidate set by construction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`] if a requested predicate ends up
    /// neither pushed nor post-filtered. Unreachable through [`MatchFilter`];
    /// kept as a guard on the coverage invariant.
    pub fn build(filter: &MatchFilter, use_composite_indexes: bool) -> Result<Self> {
        let push_equality =
            filter.has_equality() && (use_composite_indexes || !filter.has_range());

        let query = MetadataQuery {
            game_name: filter.game_name.clone().filter(|_| push_equality),
            is_gameover: filter.is_gameover.filter(|_| push_equality),
            updated_after: filter.updated_after,
            updated_before: filter.updated_before,
        };
        let post_filter = if push_equality {
            PostFilter::default()
        } else {
            PostFilter {
                game_name: filter.game_name.clone(),
                is_gameover: filter.is_gameover,
            }
        };

        let plan = Self { query, post_filter };
        plan.check_covers(filter)?;
        Ok(plan)
    }

    /// Verifies every requested predicate is pushed or post-filtered.
    fn check_covers(&self, filter: &MatchFilter) -> Result<()> {
        let game_name_covered = filter.game_name.is_none()
            || self.query.game_name.is_some()
            || self.post_filter.game_name.is_some();
        let gameover_covered = filter.is_gameover.is_none()
            || self.query.is_gameover.is_some()
            || self.post_filter.is_gameover.is_some();
        let range_covered = (filter.updated_after == self.query.updated_after)
            && (filter.updated_before == self.query.updated_before);

        if game_name_covered && gameover_covered && range_covered {
            Ok(())
        } else {
            Err(Error::InvalidFilter(format!(
                "predicates dropped from plan for filter {filter:?}"
            )))
        }
    }
}
