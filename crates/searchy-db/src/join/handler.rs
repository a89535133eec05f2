//! Join handlers.
//!
//! An [`EntityJoinHandler`] classifies a single field: it reports whether it
//! applies to the field ([`supports`](EntityJoinHandler::supports)) and, when
//! it does, how the field must be joined ([`handle`](EntityJoinHandler::handle)).
//! Handlers are stateless and pure, so one instance can be shared by any
//! number of threads and descriptors.
//!
//! ## Example
//!
//! ```
//! use searchy_db::fields::{Annotation, FieldDescriptor};
//! use searchy_db::join::{ElementCollectionJoinHandler, EntityJoinHandler, JoinDecision};
//!
//! let field = FieldDescriptor::new("Person", "Set<String>", "nickNames")
//!     .annotated(Annotation::element_collection());
//!
//! let handler = ElementCollectionJoinHandler;
//! assert!(handler.supports(&field));
//! assert_eq!(handler.handle(&field).unwrap(), JoinDecision::LEFT_FETCH);
//! ```

use std::sync::Arc;

use searchy_core::{SearchyError, SearchyResult};

use super::JoinDecision;
use crate::fields::{AnnotationKind, FetchType, FieldDescriptor};

/// Names accepted by [`handler_by_name`].
pub const BUILTIN_HANDLER_NAMES: [&str; 6] = [
    "element-collection",
    "fetching-eager",
    "fetching-all",
    "default",
    "one-to-many",
    "many-to-many",
];

/// Decides whether traversing a field requires a join.
///
/// Callers must only invoke [`handle`](Self::handle) after
/// [`supports`](Self::supports) returned `true` for the same field. The
/// built-in handlers reject anything else with
/// [`SearchyError::InvalidState`].
pub trait EntityJoinHandler: Send + Sync {
    /// A short name identifying the handler in logs and configuration.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns `true` if this handler applies to the field.
    ///
    /// Must be pure and total: no side effects, no failure.
    fn supports(&self, field: &FieldDescriptor) -> bool;

    /// Returns the join decision for a supported field.
    fn handle(&self, field: &FieldDescriptor) -> SearchyResult<JoinDecision>;
}

fn unsupported(handler: &str, field: &FieldDescriptor) -> SearchyError {
    SearchyError::InvalidState(format!(
        "join handler '{handler}' does not support field {}",
        field.join_name()
    ))
}

/// Handles fields mapped as element collections with a fetching left join.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementCollectionJoinHandler;

impl EntityJoinHandler for ElementCollectionJoinHandler {
    fn name(&self) -> &str {
        "element-collection"
    }

    fn supports(&self, field: &FieldDescriptor) -> bool {
        field.has_annotation(AnnotationKind::ElementCollection)
    }

    fn handle(&self, field: &FieldDescriptor) -> SearchyResult<JoinDecision> {
        if !self.supports(field) {
            return Err(unsupported(self.name(), field));
        }
        Ok(JoinDecision::LEFT_FETCH)
    }
}

/// Handles every field carrying one annotation kind with a fixed decision.
///
/// # Examples
///
/// ```
/// use searchy_db::fields::{AnnotationKind, FieldDescriptor};
/// use searchy_db::join::{AnnotationJoinHandler, EntityJoinHandler, JoinDecision};
///
/// let handler = AnnotationJoinHandler::new(AnnotationKind::OneToMany, JoinDecision::LEFT);
/// let field = FieldDescriptor::new("Person", "Set<Vehicle>", "vehicles")
///     .annotated(AnnotationKind::OneToMany);
/// assert_eq!(handler.handle(&field).unwrap(), JoinDecision::LEFT);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AnnotationJoinHandler {
    kind: AnnotationKind,
    decision: JoinDecision,
}

impl AnnotationJoinHandler {
    /// Creates a handler for fields annotated with `kind`.
    pub const fn new(kind: AnnotationKind, decision: JoinDecision) -> Self {
        Self { kind, decision }
    }

    /// The annotation kind this handler matches.
    pub const fn kind(&self) -> AnnotationKind {
        self.kind
    }

    /// The decision returned for every supported field.
    pub const fn decision(&self) -> JoinDecision {
        self.decision
    }
}

impl EntityJoinHandler for AnnotationJoinHandler {
    fn name(&self) -> &str {
        self.kind.marker()
    }

    fn supports(&self, field: &FieldDescriptor) -> bool {
        field.has_annotation(self.kind)
    }

    fn handle(&self, field: &FieldDescriptor) -> SearchyResult<JoinDecision> {
        if !self.supports(field) {
            return Err(unsupported(self.name(), field));
        }
        Ok(self.decision)
    }
}

/// Fetches every field whose first join annotation is eagerly fetched.
///
/// The effective fetch type is used, so a `ManyToOne` mapping without an
/// explicit fetch type counts as eager.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchingEagerJoinHandler;

impl EntityJoinHandler for FetchingEagerJoinHandler {
    fn name(&self) -> &str {
        "fetching-eager"
    }

    fn supports(&self, field: &FieldDescriptor) -> bool {
        field
            .annotations
            .first()
            .is_some_and(|a| a.fetch_type() == FetchType::Eager)
    }

    fn handle(&self, field: &FieldDescriptor) -> SearchyResult<JoinDecision> {
        if !self.supports(field) {
            return Err(unsupported(self.name(), field));
        }
        Ok(JoinDecision::LEFT_FETCH)
    }
}

/// Fetches every field with a left join.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchingAllJoinHandler;

impl EntityJoinHandler for FetchingAllJoinHandler {
    fn name(&self) -> &str {
        "fetching-all"
    }

    fn supports(&self, _field: &FieldDescriptor) -> bool {
        true
    }

    fn handle(&self, _field: &FieldDescriptor) -> SearchyResult<JoinDecision> {
        Ok(JoinDecision::LEFT_FETCH)
    }
}

/// Joins every field with a plain left join. Used as the last resort.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultJoinHandler;

impl EntityJoinHandler for DefaultJoinHandler {
    fn name(&self) -> &str {
        "default"
    }

    fn supports(&self, _field: &FieldDescriptor) -> bool {
        true
    }

    fn handle(&self, _field: &FieldDescriptor) -> SearchyResult<JoinDecision> {
        Ok(JoinDecision::LEFT)
    }
}

/// Looks up a built-in handler by its configuration name.
///
/// # Errors
///
/// Returns [`SearchyError::UnknownHandler`] if the name is not one of
/// [`BUILTIN_HANDLER_NAMES`].
pub fn handler_by_name(name: &str) -> SearchyResult<Arc<dyn EntityJoinHandler>> {
    let handler: Arc<dyn EntityJoinHandler> = match name.trim() {
        "element-collection" => Arc::new(ElementCollectionJoinHandler),
        "fetching-eager" => Arc::new(FetchingEagerJoinHandler),
        "fetching-all" => Arc::new(FetchingAllJoinHandler),
        "default" => Arc::new(DefaultJoinHandler),
        "one-to-many" => Arc::new(AnnotationJoinHandler::new(
            AnnotationKind::OneToMany,
            JoinDecision::LEFT,
        )),
        "many-to-many" => Arc::new(AnnotationJoinHandler::new(
            AnnotationKind::ManyToMany,
            JoinDecision::LEFT,
        )),
        other => return Err(SearchyError::UnknownHandler(other.to_string())),
    };
    Ok(handler)
}
