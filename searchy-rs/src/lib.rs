//! # searchy-rs
//!
//! Dynamic search join planning over entity metadata.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `searchy-rs` to get everything, or depend on individual
//! crates for finer-grained control.
//!
//! ```rust
//! # #[cfg(feature = "db")]
//! # {
//! use std::sync::Arc;
//!
//! use searchy_rs::db::descriptor::{DescriptorOption, SearchDescriptor};
//! use searchy_rs::db::fields::Annotation;
//! use searchy_rs::db::join::{ElementCollectionJoinHandler, EntityJoinManager};
//! use searchy_rs::db::model::{EntityCatalog, EntityMeta};
//!
//! let mut catalog = EntityCatalog::new();
//! catalog.register(
//!     EntityMeta::new("Person")
//!         .with_field("Set<String>", "nickNames", [Annotation::element_collection()]),
//! );
//! let descriptor = SearchDescriptor::new(
//!     "Person",
//!     [DescriptorOption::JoinHandler(Arc::new(ElementCollectionJoinHandler))],
//! );
//!
//! let manager = EntityJoinManager::new(Arc::new(catalog));
//! let joins = manager.compute_entity_joins(&descriptor).unwrap();
//! assert!(joins.get("Person.nickNames").unwrap().fetched);
//! # }
//! ```

/// Settings, logging, and error types.
pub use searchy_core as core;

/// Entity metadata, search descriptors, join handlers, and join computation.
#[cfg(feature = "db")]
pub use searchy_db as db;

/// Management commands (CLI).
#[cfg(feature = "cli")]
pub use searchy_cli as cli;

pub use serde;
pub use serde_json;
pub use tracing;
pub use tracing_subscriber;
