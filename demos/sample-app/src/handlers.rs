//! A custom join handler.

use searchy_core::{SearchyError, SearchyResult};
use searchy_db::fields::{AnnotationKind, ElementType, FieldDescriptor};
use searchy_db::join::{EntityJoinHandler, JoinDecision};

/// Fetches element collections declared as sets with their owner.
///
/// Map and list element collections are left to the next handler.
pub struct FetchElementSets;

impl EntityJoinHandler for FetchElementSets {
    fn name(&self) -> &str {
        "fetch-element-sets"
    }

    fn supports(&self, field: &FieldDescriptor) -> bool {
        field.has_annotation(AnnotationKind::ElementCollection)
            && field.element_type() == ElementType::Set
    }

    fn handle(&self, field: &FieldDescriptor) -> SearchyResult<JoinDecision> {
        if !self.supports(field) {
            return Err(SearchyError::InvalidState(format!(
                "join handler '{}' does not support field {}",
                self.name(),
                field.join_name()
            )));
        }
        Ok(JoinDecision::LEFT_FETCH)
    }
}
