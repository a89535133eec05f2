//! JPQL-style join clause rendering.
//!
//! [`JoinClauseBuilder`] turns [`EntityJoin`]s into join clauses such as
//! `LEFT JOIN FETCH p.nickNames j1`. Each field path is joined once and
//! receives an alias; a nested join is expressed relative to its parent's
//! alias.
//!
//! ## Example
//!
//! ```
//! use searchy_db::join::{EntityJoin, JoinClauseBuilder, JoinKind};
//!
//! let mut vehicles = EntityJoin::new("vehicles", "vehicles", "Person.vehicles");
//! vehicles.join_kind = JoinKind::Left;
//! let features = EntityJoin::new("vehicles.features", "features", "Vehicle.features");
//!
//! let mut builder = JoinClauseBuilder::new("p");
//! builder.extend([&vehicles, &features]);
//! assert_eq!(
//!     builder.render(),
//!     "LEFT JOIN p.vehicles j1 INNER JOIN j1.features j2"
//! );
//! ```

use std::collections::HashMap;
use std::fmt;

use super::{EntityJoin, JoinKind, FIELD_PATH_SEPARATOR};

/// One rendered join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    /// The join semantics.
    pub join_kind: JoinKind,
    /// Whether the join fetches the related data.
    pub fetch: bool,
    /// The joined path, relative to an alias (`p.vehicles`).
    pub path: String,
    /// The alias introduced by this join.
    pub alias: String,
}

impl fmt::Display for JoinClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.join_kind.sql_keyword())?;
        if self.fetch {
            f.write_str(" FETCH")?;
        }
        write!(f, " {} {}", self.path, self.alias)
    }
}

/// Accumulates join clauses for one root alias.
#[derive(Debug, Clone)]
pub struct JoinClauseBuilder {
    root_alias: String,
    clauses: Vec<JoinClause>,
    alias_by_path: HashMap<String, String>,
}

impl JoinClauseBuilder {
    /// Creates a builder whose joins start from `root_alias`.
    pub fn new(root_alias: impl Into<String>) -> Self {
        Self {
            root_alias: root_alias.into(),
            clauses: Vec::new(),
            alias_by_path: HashMap::new(),
        }
    }

    /// Adds a join and returns the alias of its target.
    ///
    /// Adding a field path twice keeps the first clause.
    pub fn add(&mut self, join: &EntityJoin) -> &str {
        if !self.alias_by_path.contains_key(&join.field_path) {
            let path = match join.field_path.rsplit_once(FIELD_PATH_SEPARATOR) {
                Some((parent, name)) => match self.alias_by_path.get(parent) {
                    Some(parent_alias) => format!("{parent_alias}.{name}"),
                    None => format!("{}.{}", self.root_alias, join.field_path),
                },
                None => format!("{}.{}", self.root_alias, join.field_path),
            };
            let alias = format!("j{}", self.clauses.len() + 1);

            self.alias_by_path
                .insert(join.field_path.clone(), alias.clone());
            self.clauses.push(JoinClause {
                join_kind: join.join_kind,
                fetch: join.fetched,
                path,
                alias,
            });
        }
        &self.alias_by_path[&join.field_path]
    }

    /// Adds every join, in order.
    pub fn extend<'a>(&mut self, joins: impl IntoIterator<Item = &'a EntityJoin>) {
        for join in joins {
            self.add(join);
        }
    }

    /// Returns the alias assigned to a field path.
    pub fn alias_of(&self, field_path: &str) -> Option<&str> {
        self.alias_by_path.get(field_path).map(String::as_str)
    }

    /// Returns the clauses, in insertion order.
    pub fn clauses(&self) -> &[JoinClause] {
        &self.clauses
    }

    /// Renders all clauses separated by spaces.
    pub fn render(&self) -> String {
        self.clauses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
