//! The computed joins of one searchable root entity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{JoinDecision, JoinKind};
use crate::fields::FieldDescriptor;

/// Separator between the segments of a field path (`vehicles.features`).
pub const FIELD_PATH_SEPARATOR: char = '.';

/// Joins a parent path and a field name into a field path.
///
/// # Examples
///
/// ```
/// use searchy_db::join::field_path;
///
/// assert_eq!(field_path("", "vehicles"), "vehicles");
/// assert_eq!(field_path("vehicles", "features"), "vehicles.features");
/// ```
pub fn field_path(parent: &str, field_name: &str) -> String {
    if parent.trim().is_empty() {
        field_name.to_string()
    } else {
        format!("{parent}{FIELD_PATH_SEPARATOR}{field_name}")
    }
}

/// One join needed to traverse a field from the root entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityJoin {
    /// The dotted path from the root entity (`vehicles.features`).
    pub field_path: String,
    /// The name of the joined field.
    pub field_name: String,
    /// The join identity, `<EntityType>.<fieldName>`.
    pub join_name: String,
    /// The join semantics.
    pub join_kind: JoinKind,
    /// Whether the related data is fetched with the owner.
    pub fetched: bool,
    /// The entity type the join leads to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
}

impl EntityJoin {
    /// Creates a non-fetching inner join.
    pub fn new(
        field_path: impl Into<String>,
        field_name: impl Into<String>,
        join_name: impl Into<String>,
    ) -> Self {
        Self {
            field_path: field_path.into(),
            field_name: field_name.into(),
            join_name: join_name.into(),
            join_kind: JoinKind::Inner,
            fetched: false,
            target_type: None,
        }
    }

    /// Creates the join for `field` at `field_path` as decided by a handler.
    pub fn from_decision(
        field_path: impl Into<String>,
        field: &FieldDescriptor,
        decision: JoinDecision,
    ) -> Self {
        Self {
            field_path: field_path.into(),
            field_name: field.field_name.clone(),
            join_name: field.join_name(),
            join_kind: decision.join_kind,
            fetched: decision.fetch,
            target_type: field.target_type().map(str::to_string),
        }
    }
}

/// A field whose join could not be decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinFailure {
    /// The join identity, `<EntityType>.<fieldName>`.
    pub join_name: String,
    /// The path at which the field was reached.
    pub field_path: String,
    /// The handler's error message.
    pub error: String,
}

/// The joins computed for a root entity, in discovery order.
///
/// Each join name appears at most once. Fields whose handler failed are
/// listed in [`failures`](Self::failures) instead.
#[derive(Debug, Clone)]
pub struct EntityJoins {
    root_type: String,
    joins: Vec<EntityJoin>,
    by_name: HashMap<String, usize>,
    failures: Vec<JoinFailure>,
}

impl EntityJoins {
    /// Creates an empty set of joins for the given root entity.
    pub fn new(root_type: impl Into<String>) -> Self {
        Self {
            root_type: root_type.into(),
            joins: Vec::new(),
            by_name: HashMap::new(),
            failures: Vec::new(),
        }
    }

    /// The root entity type.
    pub fn root_type(&self) -> &str {
        &self.root_type
    }

    /// Returns `true` if no join should be created for `field`: either it
    /// leads back to the root entity or its join has already been recorded.
    pub fn already_processed(&self, field: &FieldDescriptor) -> bool {
        if field.target_type() == Some(self.root_type.as_str()) {
            return true;
        }
        self.by_name.contains_key(&field.join_name())
    }

    /// Records a join, replacing any previous join with the same name.
    pub fn add(&mut self, join: EntityJoin) {
        if let Some(&index) = self.by_name.get(&join.join_name) {
            self.joins[index] = join;
        } else {
            self.by_name.insert(join.join_name.clone(), self.joins.len());
            self.joins.push(join);
        }
    }

    /// Records a field whose join could not be decided. A join name is
    /// recorded once.
    pub fn record_failure(&mut self, failure: JoinFailure) {
        if !self.failures.iter().any(|f| f.join_name == failure.join_name) {
            self.failures.push(failure);
        }
    }

    /// Returns the fields whose join could not be decided.
    pub fn failures(&self) -> &[JoinFailure] {
        &self.failures
    }

    /// Returns the join with the given join name.
    pub fn get(&self, join_name: &str) -> Option<&EntityJoin> {
        self.by_name.get(join_name).map(|&index| &self.joins[index])
    }

    /// Returns the join reached through the given field path.
    pub fn get_by_path(&self, field_path: &str) -> Option<&EntityJoin> {
        self.joins.iter().find(|j| j.field_path == field_path)
    }

    /// Returns every join in discovery order.
    pub fn joins(&self) -> &[EntityJoin] {
        &self.joins
    }

    /// Returns the joins matching `filter`, in discovery order.
    pub fn filter<F>(&self, filter: F) -> Vec<&EntityJoin>
    where
        F: Fn(&EntityJoin) -> bool,
    {
        self.joins.iter().filter(|j| filter(j)).collect()
    }

    /// Returns the fetching joins.
    pub fn fetched(&self) -> Vec<&EntityJoin> {
        self.filter(|j| j.fetched)
    }

    /// Returns the joins needed to reach the last segment of `path`.
    ///
    /// Every parent segment needs a join. A segment without a computed join
    /// gets a non-fetching inner join. Its join name is
    /// `<owner type>.<segment>` while the owner type is known: the root for
    /// the first segment, otherwise the target of the preceding computed
    /// join. Below an uncomputed segment the owner is unknown and the join is
    /// named after its dotted path.
    pub fn joins_for_path(&self, path: &str) -> Vec<EntityJoin> {
        let segments: Vec<&str> = path.split(FIELD_PATH_SEPARATOR).collect();
        let Some((_, parents)) = segments.split_last() else {
            return Vec::new();
        };

        let mut prefix = String::new();
        let mut owner = Some(self.root_type.clone());
        let mut joins = Vec::with_capacity(parents.len());
        for segment in parents {
            prefix = field_path(&prefix, segment);
            let join = self.get_by_path(&prefix).cloned().unwrap_or_else(|| {
                let join_name = owner
                    .as_deref()
                    .map_or_else(|| prefix.clone(), |owner| format!("{owner}.{segment}"));
                EntityJoin::new(prefix.clone(), *segment, join_name)
            });
            owner.clone_from(&join.target_type);
            joins.push(join);
        }
        joins
    }

    /// Returns the number of joins.
    pub fn len(&self) -> usize {
        self.joins.len()
    }

    /// Returns whether no join was computed.
    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Annotation;

    fn person_joins() -> EntityJoins {
        let mut joins = EntityJoins::new("Person");
        joins.add(EntityJoin::from_decision(
            "vehicles",
            &FieldDescriptor::new("Person", "Set<Vehicle>", "vehicles")
                .annotated(Annotation::one_to_many()),
            JoinDecision::LEFT,
        ));
        joins.add(EntityJoin::from_decision(
            "nickNames",
            &FieldDescriptor::new("Person", "Set<String>", "nickNames")
                .annotated(Annotation::element_collection()),
            JoinDecision::LEFT_FETCH,
        ));
        joins
    }

    #[test]
    fn test_field_path() {
        assert_eq!(field_path("", "a"), "a");
        assert_eq!(field_path("  ", "a"), "a");
        assert_eq!(field_path("a.b", "c"), "a.b.c");
    }

    #[test]
    fn test_add_and_get() {
        let joins = person_joins();
        assert_eq!(joins.root_type(), "Person");
        assert_eq!(joins.len(), 2);

        let vehicles = joins.get("Person.vehicles").unwrap();
        assert_eq!(vehicles.field_path, "vehicles");
        assert_eq!(vehicles.join_kind, JoinKind::Left);
        assert!(!vehicles.fetched);

        assert!(joins.get("Person.jobEntity").is_none());
        assert_eq!(joins.get_by_path("nickNames").unwrap().join_name, "Person.nickNames");
    }

    #[test]
    fn test_add_replaces_same_join_name() {
        let mut joins = person_joins();
        let mut replacement = EntityJoin::new("vehicles", "vehicles", "Person.vehicles");
        replacement.fetched = true;
        joins.add(replacement);

        assert_eq!(joins.len(), 2);
        assert!(joins.get("Person.vehicles").unwrap().fetched);
        assert_eq!(joins.joins()[0].join_name, "Person.vehicles");
    }

    #[test]
    fn test_already_processed() {
        let joins = person_joins();

        let back_reference =
            FieldDescriptor::new("Vehicle", "Person", "person").annotated(Annotation::many_to_one());
        assert!(joins.already_processed(&back_reference));

        let seen = FieldDescriptor::new("Person", "Set<Vehicle>", "vehicles")
            .annotated(Annotation::one_to_many());
        assert!(joins.already_processed(&seen));

        let fresh = FieldDescriptor::new("Person", "Job", "jobEntity")
            .annotated(Annotation::one_to_one());
        assert!(!joins.already_processed(&fresh));
    }

    #[test]
    fn test_record_failure_once_per_join_name() {
        let mut joins = person_joins();
        let failure = JoinFailure {
            join_name: "Person.jobEntity".to_string(),
            field_path: "jobEntity".to_string(),
            error: "Invalid state: broken".to_string(),
        };
        joins.record_failure(failure.clone());
        joins.record_failure(failure);

        assert_eq!(joins.failures().len(), 1);
        assert_eq!(joins.len(), 2);
        assert!(joins.get("Person.jobEntity").is_none());
    }

    #[test]
    fn test_filter_and_fetched() {
        let joins = person_joins();
        let fetched = joins.fetched();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].field_name, "nickNames");

        let left = joins.filter(|j| j.join_kind == JoinKind::Left);
        assert_eq!(left.len(), 2);
    }

    #[test]
    fn test_joins_for_path_uses_computed_joins() {
        let joins = person_joins();
        let path = joins.joins_for_path("vehicles.brand");
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].join_name, "Person.vehicles");
        assert_eq!(path[0].join_kind, JoinKind::Left);
    }

    #[test]
    fn test_joins_for_path_falls_back_to_inner_join() {
        let joins = person_joins();
        let path = joins.joins_for_path("vehicles.features.name");
        assert_eq!(path.len(), 2);
        assert_eq!(path[1].field_path, "vehicles.features");
        assert_eq!(path[1].field_name, "features");
        assert_eq!(path[1].join_kind, JoinKind::Inner);
        assert!(!path[1].fetched);
        assert_eq!(path[1].join_name, "Vehicle.features");
    }

    #[test]
    fn test_joins_for_path_names_fallback_joins_by_owner() {
        let joins = person_joins();

        let path = joins.joins_for_path("jobEntity.company.name");
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].join_name, "Person.jobEntity");
        assert_eq!(path[0].field_path, "jobEntity");
        // The owner of `company` is unknown below an uncomputed segment.
        assert_eq!(path[1].join_name, "jobEntity.company");
    }

    #[test]
    fn test_joins_for_path_three_levels() {
        let joins = person_joins();
        let path = joins.joins_for_path("vehicles.features.metadata.key");
        let paths: Vec<&str> = path.iter().map(|j| j.field_path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["vehicles", "vehicles.features", "vehicles.features.metadata"]
        );
    }

    #[test]
    fn test_from_decision_records_target_type() {
        let joins = person_joins();
        assert_eq!(
            joins.get("Person.vehicles").unwrap().target_type.as_deref(),
            Some("Vehicle")
        );
        assert_eq!(
            joins.get("Person.nickNames").unwrap().target_type.as_deref(),
            Some("String")
        );
    }

    #[test]
    fn test_joins_for_path_without_parents() {
        let joins = person_joins();
        assert!(joins.joins_for_path("firstName").is_empty());
    }
}
