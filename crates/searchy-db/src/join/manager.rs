//! Computes the joins of searchable root entities.
//!
//! [`EntityJoinManager`] walks the entity graph from a descriptor's root
//! entity. Every field carrying a join annotation is classified with the
//! descriptor's handlers followed by [`DefaultJoinHandler`]; the resulting
//! joins are cached per descriptor id.
//!
//! A field is skipped when it leads back to the root entity or when its join
//! was already recorded, which also stops traversal of cyclic models. A
//! handler error is local to its field: the field is recorded as a
//! [`JoinFailure`] and the remaining fields are still planned.
//!
//! With decision caching enabled (the default) each descriptor also keeps a
//! [`DecisionCache`], so a field is classified at most once per descriptor
//! across join computations and [`EntityJoinManager::resolve_field`] calls.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use searchy_core::logging::resolution_span;
use searchy_core::{SearchyResult, Settings};

use super::{
    field_path, DecisionCache, DefaultJoinHandler, EntityJoin, EntityJoins, JoinFailure,
    JoinHandlerChain, Resolution,
};
use crate::descriptor::SearchDescriptor;
use crate::fields::FieldDescriptor;
use crate::model::EntityCatalog;

/// Computes and caches [`EntityJoins`] per search descriptor.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use searchy_db::descriptor::{DescriptorOption, SearchDescriptor};
/// use searchy_db::fields::Annotation;
/// use searchy_db::join::{ElementCollectionJoinHandler, EntityJoinManager, JoinKind};
/// use searchy_db::model::{EntityCatalog, EntityMeta};
///
/// let mut catalog = EntityCatalog::new();
/// catalog.register(
///     EntityMeta::new("Person")
///         .with_field("String", "firstName", [])
///         .with_field("Set<String>", "nickNames", [Annotation::element_collection()]),
/// );
///
/// let manager = EntityJoinManager::new(Arc::new(catalog));
/// let descriptor = SearchDescriptor::new(
///     "Person",
///     [DescriptorOption::join_handler(ElementCollectionJoinHandler)],
/// );
///
/// let joins = manager.compute_entity_joins(&descriptor).unwrap();
/// let nick_names = joins.get("Person.nickNames").unwrap();
/// assert_eq!(nick_names.join_kind, JoinKind::Left);
/// assert!(nick_names.fetched);
/// ```
#[derive(Debug)]
pub struct EntityJoinManager {
    catalog: Arc<EntityCatalog>,
    cache_decisions: bool,
    joins_by_descriptor: RwLock<HashMap<String, Arc<EntityJoins>>>,
    decisions_by_descriptor: RwLock<HashMap<String, Arc<DecisionCache>>>,
}

/// How one join computation classifies fields.
enum Resolver {
    Direct(JoinHandlerChain),
    Cached(Arc<DecisionCache>),
}

impl Resolver {
    fn resolve(&self, field: &FieldDescriptor) -> SearchyResult<Resolution> {
        match self {
            Self::Direct(chain) => chain.resolve(field),
            Self::Cached(cache) => cache.resolve(field),
        }
    }
}

impl EntityJoinManager {
    /// Creates a manager over the given entity catalog, with decision
    /// caching enabled.
    pub fn new(catalog: Arc<EntityCatalog>) -> Self {
        Self {
            catalog,
            cache_decisions: true,
            joins_by_descriptor: RwLock::new(HashMap::new()),
            decisions_by_descriptor: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a manager configured by `settings.cache_decisions`.
    pub fn from_settings(catalog: Arc<EntityCatalog>, settings: &Settings) -> Self {
        Self::new(catalog).with_decision_cache(settings.cache_decisions)
    }

    /// Enables or disables per-descriptor decision caching.
    pub fn with_decision_cache(mut self, enabled: bool) -> Self {
        self.cache_decisions = enabled;
        self
    }

    /// Returns whether decisions are cached per descriptor.
    pub fn caches_decisions(&self) -> bool {
        self.cache_decisions
    }

    /// The entity catalog used to look up fields.
    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    /// Returns the joins of the descriptor's root entity, computing them on
    /// first use.
    ///
    /// A handler error does not fail the computation; the field is listed in
    /// [`EntityJoins::failures`] and logged.
    ///
    /// # Errors
    ///
    /// Returns [`SearchyError::UnknownEntity`](searchy_core::SearchyError::UnknownEntity)
    /// if the root entity is not in the catalog.
    pub fn compute_entity_joins(
        &self,
        descriptor: &SearchDescriptor,
    ) -> SearchyResult<Arc<EntityJoins>> {
        if let Some(joins) = self
            .joins_by_descriptor
            .read()
            .expect("entity joins lock poisoned")
            .get(descriptor.id())
        {
            return Ok(Arc::clone(joins));
        }

        let computed = Arc::new(self.init_entity_joins(descriptor)?);
        let mut cache = self
            .joins_by_descriptor
            .write()
            .expect("entity joins lock poisoned");
        Ok(Arc::clone(
            cache.entry(descriptor.id().to_string()).or_insert(computed),
        ))
    }

    /// Classifies one field with the descriptor's handlers followed by
    /// [`DefaultJoinHandler`], through the descriptor's decision cache when
    /// caching is enabled.
    ///
    /// # Errors
    ///
    /// Propagates the error of the deciding handler.
    pub fn resolve_field(
        &self,
        descriptor: &SearchDescriptor,
        field: &FieldDescriptor,
    ) -> SearchyResult<Resolution> {
        self.resolver(descriptor).resolve(field)
    }

    /// Returns the cached joins of a descriptor without computing them.
    pub fn cached(&self, descriptor_id: &str) -> Option<Arc<EntityJoins>> {
        self.joins_by_descriptor
            .read()
            .expect("entity joins lock poisoned")
            .get(descriptor_id)
            .cloned()
    }

    /// Returns the decision cache of a descriptor, if one was created.
    pub fn decision_cache(&self, descriptor_id: &str) -> Option<Arc<DecisionCache>> {
        self.decisions_by_descriptor
            .read()
            .expect("decision caches lock poisoned")
            .get(descriptor_id)
            .cloned()
    }

    /// Drops every computed join set. Cached decisions are kept.
    pub fn clear(&self) {
        self.joins_by_descriptor
            .write()
            .expect("entity joins lock poisoned")
            .clear();
    }

    /// Drops every cached decision.
    pub fn clear_decisions(&self) {
        self.decisions_by_descriptor
            .write()
            .expect("decision caches lock poisoned")
            .clear();
    }

    fn resolver(&self, descriptor: &SearchDescriptor) -> Resolver {
        if !self.cache_decisions {
            return Resolver::Direct(Self::chain_for(descriptor));
        }

        if let Some(cache) = self.decision_cache(descriptor.id()) {
            return Resolver::Cached(cache);
        }
        let mut caches = self
            .decisions_by_descriptor
            .write()
            .expect("decision caches lock poisoned");
        let cache = caches
            .entry(descriptor.id().to_string())
            .or_insert_with(|| Arc::new(DecisionCache::new(Self::chain_for(descriptor))));
        Resolver::Cached(Arc::clone(cache))
    }

    fn chain_for(descriptor: &SearchDescriptor) -> JoinHandlerChain {
        descriptor
            .join_handlers()
            .clone()
            .with_handler(DefaultJoinHandler)
    }

    fn init_entity_joins(&self, descriptor: &SearchDescriptor) -> SearchyResult<EntityJoins> {
        let root = descriptor.entity_type();
        self.catalog.get(root)?;

        let resolver = self.resolver(descriptor);
        let mut joins = EntityJoins::new(root);
        self.collect_joins(root, "", &mut joins, &resolver)?;

        tracing::debug!(
            id = descriptor.id(),
            entity = root,
            joins = joins.len(),
            failures = joins.failures().len(),
            "Computed entity joins"
        );
        Ok(joins)
    }

    fn collect_joins(
        &self,
        entity_type: &str,
        parent_path: &str,
        joins: &mut EntityJoins,
        resolver: &Resolver,
    ) -> SearchyResult<()> {
        for field in self.catalog.get(entity_type)?.join_fields() {
            if joins.already_processed(field) {
                continue;
            }

            let span = resolution_span(&field.entity_type, &field.field_name);
            let _guard = span.enter();

            let path = field_path(parent_path, &field.field_name);
            let resolution = match resolver.resolve(field) {
                Ok(resolution) => resolution,
                Err(e) => {
                    tracing::error!(error = %e, path = %path, "Join resolution failed, field skipped");
                    joins.record_failure(JoinFailure {
                        join_name: field.join_name(),
                        field_path: path,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let Resolution::Matched { decision, .. } = resolution else {
                continue;
            };
            if !decision.required {
                tracing::debug!("Field traversed without a join");
                continue;
            }

            joins.add(EntityJoin::from_decision(path.clone(), field, decision));

            if let Some(target) = field.target_type() {
                if self.catalog.is_entity(target) {
                    self.collect_joins(target, &path, joins, resolver)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use searchy_core::{SearchyError, SearchyResult, Settings};

    use super::*;
    use crate::descriptor::DescriptorOption;
    use crate::fields::{Annotation, FieldDescriptor};
    use crate::join::{
        ElementCollectionJoinHandler, EntityJoinHandler, JoinDecision, JoinKind,
    };
    use crate::model::EntityMeta;

    fn catalog() -> Arc<EntityCatalog> {
        let mut catalog = EntityCatalog::new();
        catalog.register(
            EntityMeta::new("Person")
                .with_field("String", "firstName", [])
                .with_field("Set<String>", "nickNames", [Annotation::element_collection()])
                .with_field("Set<Vehicle>", "vehicles", [Annotation::one_to_many()]),
        );
        catalog.register(
            EntityMeta::new("Vehicle")
                .with_field("String", "brand", [])
                .with_field("Person", "person", [Annotation::many_to_one()])
                .with_field("Map<String, Feature>", "features", [Annotation::one_to_many()]),
        );
        catalog.register(
            EntityMeta::new("Feature")
                .with_field("String", "name", [])
                .with_field("Map<String, String>", "metadata", [Annotation::element_collection()])
                .with_field("Vehicle", "vehicle", [Annotation::many_to_one()]),
        );
        Arc::new(catalog)
    }

    #[test]
    fn test_default_handler_only() {
        let manager = EntityJoinManager::new(catalog());
        let joins = manager
            .compute_entity_joins(&SearchDescriptor::new("Person", []))
            .unwrap();

        let names: Vec<&str> = joins.joins().iter().map(|j| j.join_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Person.nickNames",
                "Person.vehicles",
                "Vehicle.features",
                "Feature.metadata",
                "Feature.vehicle",
            ]
        );
        assert!(joins.joins().iter().all(|j| j.join_kind == JoinKind::Left && !j.fetched));
    }

    #[test]
    fn test_paths_follow_traversal() {
        let manager = EntityJoinManager::new(catalog());
        let joins = manager
            .compute_entity_joins(&SearchDescriptor::new("Person", []))
            .unwrap();
        assert_eq!(joins.get("Vehicle.features").unwrap().field_path, "vehicles.features");
        assert_eq!(
            joins.get("Feature.metadata").unwrap().field_path,
            "vehicles.features.metadata"
        );
    }

    #[test]
    fn test_back_reference_to_root_skipped() {
        let manager = EntityJoinManager::new(catalog());
        let joins = manager
            .compute_entity_joins(&SearchDescriptor::new("Person", []))
            .unwrap();
        assert!(joins.get("Vehicle.person").is_none());
    }

    #[test]
    fn test_descriptor_handlers_run_before_default() {
        let manager = EntityJoinManager::new(catalog());
        let descriptor = SearchDescriptor::new(
            "Person",
            [DescriptorOption::join_handler(ElementCollectionJoinHandler)],
        );
        let joins = manager.compute_entity_joins(&descriptor).unwrap();

        assert!(joins.get("Person.nickNames").unwrap().fetched);
        assert!(joins.get("Feature.metadata").unwrap().fetched);
        assert!(!joins.get("Person.vehicles").unwrap().fetched);
    }

    #[test]
    fn test_results_cached_per_descriptor_id() {
        let manager = EntityJoinManager::new(catalog());
        let descriptor = SearchDescriptor::new("Person", []);

        let first = manager.compute_entity_joins(&descriptor).unwrap();
        let second = manager.compute_entity_joins(&descriptor).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // Same id, different handlers: the cached result wins.
        let other = SearchDescriptor::new(
            "Person",
            [DescriptorOption::join_handler(ElementCollectionJoinHandler)],
        );
        let third = manager.compute_entity_joins(&other).unwrap();
        assert!(Arc::ptr_eq(&first, &third));

        manager.clear();
        assert!(manager.cached("person").is_none());
    }

    #[test]
    fn test_unknown_root_entity() {
        let manager = EntityJoinManager::new(catalog());
        let err = manager
            .compute_entity_joins(&SearchDescriptor::new("Robot", []))
            .unwrap_err();
        assert!(matches!(err, SearchyError::UnknownEntity(name) if name == "Robot"));
        assert!(manager.cached("robot").is_none());
    }

    #[test]
    fn test_not_required_decision_records_nothing() {
        struct NoJoin;

        impl EntityJoinHandler for NoJoin {
            fn supports(&self, field: &FieldDescriptor) -> bool {
                field.field_name == "vehicles"
            }

            fn handle(&self, _field: &FieldDescriptor) -> SearchyResult<JoinDecision> {
                Ok(JoinDecision::new(false, JoinKind::Inner, false))
            }
        }

        let manager = EntityJoinManager::new(catalog());
        let joins = manager
            .compute_entity_joins(&SearchDescriptor::new(
                "Person",
                [DescriptorOption::join_handler(NoJoin)],
            ))
            .unwrap();
        assert_eq!(joins.len(), 1);
        assert!(joins.get("Person.nickNames").is_some());
    }

    #[test]
    fn test_handler_error_is_local_to_its_field() {
        struct BrokenForVehicles;

        impl EntityJoinHandler for BrokenForVehicles {
            fn supports(&self, field: &FieldDescriptor) -> bool {
                field.join_name() == "Person.vehicles"
            }

            fn handle(&self, _field: &FieldDescriptor) -> SearchyResult<JoinDecision> {
                Err(SearchyError::InvalidState("broken".into()))
            }
        }

        let manager = EntityJoinManager::new(catalog());
        let joins = manager
            .compute_entity_joins(&SearchDescriptor::new(
                "Person",
                [DescriptorOption::join_handler(BrokenForVehicles)],
            ))
            .unwrap();

        assert!(joins.get("Person.nickNames").is_some());
        assert!(joins.get("Person.vehicles").is_none());
        // Nothing below the failed field is reached.
        assert!(joins.get("Vehicle.features").is_none());

        assert_eq!(joins.failures().len(), 1);
        let failure = &joins.failures()[0];
        assert_eq!(failure.join_name, "Person.vehicles");
        assert_eq!(failure.field_path, "vehicles");
        assert!(failure.error.contains("broken"));

        // The partial plan is cached like any other.
        assert!(Arc::ptr_eq(&joins, &manager.cached("person").unwrap()));
    }

    struct CountingDefault {
        calls: Arc<AtomicUsize>,
    }

    impl EntityJoinHandler for CountingDefault {
        fn supports(&self, _field: &FieldDescriptor) -> bool {
            true
        }

        fn handle(&self, _field: &FieldDescriptor) -> SearchyResult<JoinDecision> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(JoinDecision::LEFT)
        }
    }

    fn counting_descriptor(calls: &Arc<AtomicUsize>) -> SearchDescriptor {
        SearchDescriptor::new(
            "Person",
            [DescriptorOption::join_handler(CountingDefault {
                calls: Arc::clone(calls),
            })],
        )
    }

    #[test]
    fn test_decisions_cached_across_computations() {
        let calls = Arc::new(AtomicUsize::new(0));
        let descriptor = counting_descriptor(&calls);
        let manager = EntityJoinManager::new(catalog());
        assert!(manager.caches_decisions());

        let first = manager.compute_entity_joins(&descriptor).unwrap();
        let classified = calls.load(Ordering::SeqCst);
        assert_eq!(classified, first.len());

        manager.clear();
        let second = manager.compute_entity_joins(&descriptor).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), first.len());
        assert_eq!(calls.load(Ordering::SeqCst), classified);

        let cache = manager.decision_cache("person").unwrap();
        assert_eq!(cache.len(), classified);
    }

    #[test]
    fn test_resolve_field_hits_decision_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let descriptor = counting_descriptor(&calls);
        let manager = EntityJoinManager::new(catalog());
        let field = manager.catalog().field("Person", "vehicles").unwrap().clone();

        let first = manager.resolve_field(&descriptor, &field).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let second = manager.resolve_field(&descriptor, &field).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            manager.decision_cache("person").unwrap().get("Person", "vehicles"),
            Some(first)
        );

        manager.clear_decisions();
        manager.resolve_field(&descriptor, &field).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_decision_cache_disabled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let descriptor = counting_descriptor(&calls);
        let settings = Settings {
            cache_decisions: false,
            ..Settings::default()
        };
        let manager = EntityJoinManager::from_settings(catalog(), &settings);
        assert!(!manager.caches_decisions());

        let first = manager.compute_entity_joins(&descriptor).unwrap();
        manager.clear();
        manager.compute_entity_joins(&descriptor).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2 * first.len());
        assert!(manager.decision_cache("person").is_none());
    }
}
