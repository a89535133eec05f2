//! # searchy-db
//!
//! Join planning for searchable entities. Provides the
//! [`EntityJoinHandler`](join::EntityJoinHandler) capability for deciding
//! whether a field traversed by a search expression needs an explicit join,
//! the [`JoinHandlerChain`](join::JoinHandlerChain) that dispatches to the
//! first handler supporting a field, and the
//! [`EntityJoinManager`](join::EntityJoinManager) that assembles per-field
//! decisions into the joins of one root entity.
//!
//! ## Architecture
//!
//! Entity metadata is registered once, either statically through the
//! [`Entity`](model::Entity) trait or from a model file, into an
//! [`EntityCatalog`](model::EntityCatalog). Applications describe their
//! searchable roots with [`SearchDescriptor`](descriptor::SearchDescriptor)s,
//! each carrying its own ordered join handlers. Join computation walks the
//! entity graph from the root, asks the handler chain about every join
//! field, and caches the result per descriptor id. Nothing here touches a
//! database.
//!
//! ## Module Overview
//!
//! - [`fields`] - Field descriptors and persistence-mapping annotations
//! - [`model`] - The [`Entity`](model::Entity) trait and the entity catalog
//! - [`join`] - Join handlers, the handler chain, decision caching, join
//!   computation, and join clause rendering
//! - [`descriptor`] - Search descriptors and the descriptor registry

// These clippy lints are intentionally allowed for the join planning crate:
// - result_large_err: SearchyError is the workspace error type and should be used consistently
// - doc_markdown: backtick requirements for documentation items are too strict
// - module_name_repetitions: join::JoinKind and friends read better fully qualified
// - return_self_not_must_use: builder pattern methods are self-documenting
#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::use_self)]
#![allow(clippy::significant_drop_tightening)]

pub mod descriptor;
pub mod fields;
pub mod join;
pub mod model;

// Re-export the most commonly used types at the crate root.
pub use descriptor::{DescriptorOption, DescriptorRegistry, SearchConfigurer, SearchDescriptor};
pub use fields::{Annotation, AnnotationKind, ElementType, FetchType, FieldDescriptor};
pub use join::{
    handler_by_name, AnnotationJoinHandler, DecisionCache, DefaultJoinHandler,
    ElementCollectionJoinHandler, EntityJoin, EntityJoinHandler, EntityJoinManager, EntityJoins,
    FetchingAllJoinHandler, FetchingEagerJoinHandler, JoinClause, JoinClauseBuilder, JoinFailure,
    JoinDecision, JoinHandlerChain, JoinKind, Resolution,
};
pub use model::{Entity, EntityCatalog, EntityMeta};
