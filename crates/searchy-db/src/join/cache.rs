//! Memoized join decisions.
//!
//! Handlers are pure, so the decision for a field depends only on the chain
//! and the field's identity. [`DecisionCache`] keeps one [`Resolution`] per
//! `(entity type, field name)` and shares it between threads.

use std::collections::HashMap;
use std::sync::RwLock;

use searchy_core::SearchyResult;

use super::{JoinHandlerChain, Resolution};
use crate::fields::FieldDescriptor;

type CacheKey = (String, String);

/// A handler chain whose resolutions are cached by `(entity type, field name)`.
///
/// Concurrent callers resolving the same key may both run the chain, but only
/// the first result is stored and every caller observes that entry. Errors
/// are returned to the caller and never stored.
///
/// # Examples
///
/// ```
/// use searchy_db::fields::{Annotation, FieldDescriptor};
/// use searchy_db::join::{DecisionCache, ElementCollectionJoinHandler, JoinHandlerChain};
///
/// let cache = DecisionCache::new(JoinHandlerChain::new().with_handler(ElementCollectionJoinHandler));
/// let field = FieldDescriptor::new("Person", "Set<String>", "nickNames")
///     .annotated(Annotation::element_collection());
///
/// let first = cache.resolve(&field).unwrap();
/// let second = cache.resolve(&field).unwrap();
/// assert_eq!(first, second);
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug)]
pub struct DecisionCache {
    chain: JoinHandlerChain,
    entries: RwLock<HashMap<CacheKey, Resolution>>,
}

impl DecisionCache {
    /// Creates an empty cache over the given chain.
    pub fn new(chain: JoinHandlerChain) -> Self {
        Self {
            chain,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The chain whose resolutions are cached.
    pub fn chain(&self) -> &JoinHandlerChain {
        &self.chain
    }

    /// Returns the cached resolution for the field, computing it on a miss.
    ///
    /// # Errors
    ///
    /// Propagates the error of the deciding handler; nothing is cached then.
    pub fn resolve(&self, field: &FieldDescriptor) -> SearchyResult<Resolution> {
        let key = (field.entity_type.clone(), field.field_name.clone());

        if let Some(hit) = self
            .entries
            .read()
            .expect("decision cache lock poisoned")
            .get(&key)
        {
            tracing::trace!(
                entity = %field.entity_type,
                field = %field.field_name,
                "Join decision cache hit"
            );
            return Ok(*hit);
        }

        let computed = self.chain.resolve(field)?;
        let mut entries = self.entries.write().expect("decision cache lock poisoned");
        Ok(*entries.entry(key).or_insert(computed))
    }

    /// Returns the cached resolution without computing it.
    pub fn get(&self, entity_type: &str, field_name: &str) -> Option<Resolution> {
        self.entries
            .read()
            .expect("decision cache lock poisoned")
            .get(&(entity_type.to_string(), field_name.to_string()))
            .copied()
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .expect("decision cache lock poisoned")
            .len()
    }

    /// Returns whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .expect("decision cache lock poisoned")
            .clear();
    }
}
