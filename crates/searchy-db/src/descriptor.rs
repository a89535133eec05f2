//! Search descriptors and the descriptor registry.
//!
//! A [`SearchDescriptor`] names a searchable root entity and the ordered join
//! handlers consulted for its fields. Descriptors are immutable once built:
//! every option is passed up front as a [`DescriptorOption`].
//!
//! Applications contribute descriptors at startup through
//! [`SearchConfigurer`] implementations, which add them to a
//! [`DescriptorRegistry`].
//!
//! ## Example
//!
//! ```
//! use searchy_db::descriptor::{DescriptorOption, DescriptorRegistry, SearchDescriptor};
//! use searchy_db::join::ElementCollectionJoinHandler;
//!
//! let descriptor = SearchDescriptor::new(
//!     "Person",
//!     [DescriptorOption::join_handler(ElementCollectionJoinHandler)],
//! );
//! assert_eq!(descriptor.id(), "person");
//!
//! let mut registry = DescriptorRegistry::new();
//! registry.add(descriptor).unwrap();
//! assert!(registry.get("person").is_some());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use searchy_core::{SearchyError, SearchyResult};

use crate::join::{EntityJoinHandler, JoinHandlerChain};
use crate::model::Entity;

/// One configuration option of a [`SearchDescriptor`].
#[derive(Clone)]
pub enum DescriptorOption {
    /// Overrides the descriptor id.
    Id(String),
    /// Appends a join handler to the descriptor's chain.
    JoinHandler(Arc<dyn EntityJoinHandler>),
}

impl DescriptorOption {
    /// Shorthand for [`DescriptorOption::Id`].
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Shorthand for [`DescriptorOption::JoinHandler`].
    pub fn join_handler(handler: impl EntityJoinHandler + 'static) -> Self {
        Self::JoinHandler(Arc::new(handler))
    }
}

impl fmt::Debug for DescriptorOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Self::JoinHandler(handler) => f.debug_tuple("JoinHandler").field(&handler.name()).finish(),
        }
    }
}

/// A searchable root entity and its join handlers.
#[derive(Debug, Clone)]
pub struct SearchDescriptor {
    id: String,
    entity_type: String,
    join_handlers: JoinHandlerChain,
}

impl SearchDescriptor {
    /// Creates a descriptor for `entity_type`.
    ///
    /// The id defaults to the entity type with a lower-cased first letter.
    /// Join handlers keep the order in which they appear in `options`; a later
    /// `Id` option overrides an earlier one.
    pub fn new(
        entity_type: impl Into<String>,
        options: impl IntoIterator<Item = DescriptorOption>,
    ) -> Self {
        let entity_type = entity_type.into();
        let mut id = None;
        let mut join_handlers = JoinHandlerChain::new();
        for option in options {
            match option {
                DescriptorOption::Id(value) => id = Some(value),
                DescriptorOption::JoinHandler(handler) => join_handlers.push(handler),
            }
        }
        Self {
            id: id.unwrap_or_else(|| decapitalize(&entity_type)),
            entity_type,
            join_handlers,
        }
    }

    /// Creates a descriptor for the entity type `E`.
    pub fn for_entity<E: Entity>(options: impl IntoIterator<Item = DescriptorOption>) -> Self {
        Self::new(E::entity_name(), options)
    }

    /// The descriptor id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The root entity type.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// The join handlers, in evaluation order.
    pub fn join_handlers(&self) -> &JoinHandlerChain {
        &self.join_handlers
    }
}

fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Contributes search descriptors at application startup.
pub trait SearchConfigurer {
    /// Adds this configurer's descriptors to the registry.
    ///
    /// # Errors
    ///
    /// Returns [`SearchyError::DuplicateDescriptor`] when a descriptor id is
    /// already taken.
    fn add_search_descriptors(&self, registry: &mut DescriptorRegistry) -> SearchyResult<()>;
}

/// Registered search descriptors, keyed by id.
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    descriptors: HashMap<String, Arc<SearchDescriptor>>,
}

impl DescriptorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SearchyError::DuplicateDescriptor`] if the id is taken.
    pub fn add(&mut self, descriptor: SearchDescriptor) -> SearchyResult<()> {
        if self.descriptors.contains_key(descriptor.id()) {
            return Err(SearchyError::DuplicateDescriptor(descriptor.id().to_string()));
        }
        tracing::debug!(
            id = descriptor.id(),
            entity = descriptor.entity_type(),
            handlers = descriptor.join_handlers().len(),
            "Registered search descriptor"
        );
        self.descriptors
            .insert(descriptor.id().to_string(), Arc::new(descriptor));
        Ok(())
    }

    /// Returns the descriptor with the given id.
    pub fn get(&self, id: &str) -> Option<Arc<SearchDescriptor>> {
        self.descriptors.get(id).cloned()
    }

    /// Returns the registered ids, sorted.
    pub fn descriptor_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.descriptors.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Runs a configurer against this registry.
    ///
    /// # Errors
    ///
    /// Propagates the configurer's error.
    pub fn configure(&mut self, configurer: &dyn SearchConfigurer) -> SearchyResult<()> {
        configurer.add_search_descriptors(self)
    }

    /// Returns the number of registered descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::{DefaultJoinHandler, ElementCollectionJoinHandler, FetchingAllJoinHandler};

    #[test]
    fn test_default_id_is_decapitalized() {
        assert_eq!(SearchDescriptor::new("Person", []).id(), "person");
        assert_eq!(SearchDescriptor::new("URLEntry", []).id(), "uRLEntry");
        assert_eq!(SearchDescriptor::new("", []).id(), "");
    }

    #[test]
    fn test_id_option_overrides_default() {
        let descriptor = SearchDescriptor::new(
            "Person",
            [DescriptorOption::id("first"), DescriptorOption::id("people")],
        );
        assert_eq!(descriptor.id(), "people");
        assert_eq!(descriptor.entity_type(), "Person");
    }

    #[test]
    fn test_join_handlers_keep_order() {
        let descriptor = SearchDescriptor::new(
            "Person",
            [
                DescriptorOption::join_handler(ElementCollectionJoinHandler),
                DescriptorOption::id("person"),
                DescriptorOption::join_handler(FetchingAllJoinHandler),
            ],
        );
        let names: Vec<&str> = descriptor
            .join_handlers()
            .handlers()
            .iter()
            .map(|h| h.name())
            .collect();
        assert_eq!(names, vec!["element-collection", "fetching-all"]);
    }

    #[test]
    fn test_option_debug() {
        let option = DescriptorOption::join_handler(DefaultJoinHandler);
        assert_eq!(format!("{option:?}"), r#"JoinHandler("default")"#);
    }

    #[test]
    fn test_registry_rejects_duplicate_ids() {
        let mut registry = DescriptorRegistry::new();
        registry.add(SearchDescriptor::new("Person", [])).unwrap();
        let err = registry
            .add(SearchDescriptor::new("Person", [DescriptorOption::join_handler(DefaultJoinHandler)]))
            .unwrap_err();
        assert!(matches!(err, SearchyError::DuplicateDescriptor(id) if id == "person"));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("person").unwrap().join_handlers().is_empty());
    }

    #[test]
    fn test_registry_ids_sorted() {
        let mut registry = DescriptorRegistry::new();
        registry.add(SearchDescriptor::new("Vehicle", [])).unwrap();
        registry.add(SearchDescriptor::new("Address", [])).unwrap();
        registry.add(SearchDescriptor::new("Person", [])).unwrap();
        assert_eq!(registry.descriptor_ids(), vec!["address", "person", "vehicle"]);
        assert!(registry.get("job").is_none());
    }

    #[test]
    fn test_configurer() {
        struct PeopleConfigurer;

        impl SearchConfigurer for PeopleConfigurer {
            fn add_search_descriptors(&self, registry: &mut DescriptorRegistry) -> SearchyResult<()> {
                registry.add(SearchDescriptor::new(
                    "Person",
                    [DescriptorOption::join_handler(ElementCollectionJoinHandler)],
                ))?;
                registry.add(SearchDescriptor::new("Vehicle", []))
            }
        }

        let mut registry = DescriptorRegistry::new();
        registry.configure(&PeopleConfigurer).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.configure(&PeopleConfigurer).is_err());
    }
}
