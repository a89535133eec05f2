//! Join planning.
//!
//! This module contains everything between a [`FieldDescriptor`] and the
//! joins a search query needs:
//!
//! - [`handler`] - The [`EntityJoinHandler`] capability and the built-in handlers
//! - [`chain`] - First-match dispatch over an ordered list of handlers
//! - [`cache`] - Memoized decisions keyed by `(entity type, field name)`
//! - [`entity_joins`] - The computed joins of one root entity
//! - [`manager`] - Walks the entity graph and computes [`EntityJoins`]
//! - [`clause`] - Renders joins as JPQL-style join clauses
//!
//! [`FieldDescriptor`]: crate::fields::FieldDescriptor

pub mod cache;
pub mod chain;
pub mod clause;
pub mod entity_joins;
pub mod handler;
pub mod manager;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use cache::DecisionCache;
pub use chain::{JoinHandlerChain, Resolution};
pub use clause::{JoinClause, JoinClauseBuilder};
pub use entity_joins::{field_path, EntityJoin, EntityJoins, JoinFailure, FIELD_PATH_SEPARATOR};
pub use handler::{
    handler_by_name, AnnotationJoinHandler, DefaultJoinHandler, ElementCollectionJoinHandler,
    EntityJoinHandler, FetchingAllJoinHandler, FetchingEagerJoinHandler, BUILTIN_HANDLER_NAMES,
};
pub use manager::EntityJoinManager;

/// The join semantics of a required join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    /// Only rows with a related row are kept.
    #[default]
    Inner,
    /// Every owner row is kept, related or not.
    Left,
}

impl JoinKind {
    /// Returns the SQL keyword for this join kind.
    pub const fn sql_keyword(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner => f.write_str("inner"),
            Self::Left => f.write_str("left"),
        }
    }
}

/// The outcome of classifying one field.
///
/// A decision is immutable and freely copied; handlers create a fresh one for
/// every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinDecision {
    /// Whether an explicit join is needed to traverse the field.
    pub required: bool,
    /// The join semantics when `required` is true.
    pub join_kind: JoinKind,
    /// Whether the related data is loaded together with the owner.
    pub fetch: bool,
}

impl JoinDecision {
    /// A required left join that fetches the related data.
    pub const LEFT_FETCH: Self = Self::new(true, JoinKind::Left, true);

    /// A required left join that does not fetch the related data.
    pub const LEFT: Self = Self::new(true, JoinKind::Left, false);

    /// Creates a decision.
    pub const fn new(required: bool, join_kind: JoinKind, fetch: bool) -> Self {
        Self {
            required,
            join_kind,
            fetch,
        }
    }
}

impl fmt::Display for JoinDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.required {
            return f.write_str("no join");
        }
        write!(f, "{} join", self.join_kind)?;
        if self.fetch {
            f.write_str(" fetch")?;
        }
        Ok(())
    }
}
