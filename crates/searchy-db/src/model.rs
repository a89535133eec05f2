//! Entity metadata and the entity catalog.
//!
//! The [`Entity`] trait gives a type static access to its [`EntityMeta`]: the
//! entity name and its persistent fields. An [`EntityCatalog`] collects the
//! metadata of every known entity and answers the two questions join
//! computation needs: which fields does an entity declare, and is a given type
//! an entity at all.
//!
//! Catalogs can also be loaded from a model file:
//!
//! ```toml
//! [[entity]]
//! name = "Person"
//!
//! [[entity.field]]
//! name = "nickNames"
//! type = "Set<String>"
//! annotations = [{ kind = "element-collection", fetch = "eager" }]
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use searchy_core::{SearchyError, SearchyResult};
use serde::{Deserialize, Serialize};

use crate::fields::{Annotation, FieldDescriptor};

/// A searchable entity type with static metadata.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
///
/// use searchy_db::fields::Annotation;
/// use searchy_db::model::{Entity, EntityMeta};
///
/// struct Person;
///
/// impl Entity for Person {
///     fn meta() -> &'static EntityMeta {
///         static META: LazyLock<EntityMeta> = LazyLock::new(|| {
///             EntityMeta::new("Person")
///                 .with_field("String", "firstName", [])
///                 .with_field("Set<String>", "nickNames", [Annotation::element_collection()])
///         });
///         &META
///     }
/// }
///
/// assert_eq!(Person::entity_name(), "Person");
/// assert_eq!(Person::meta().fields.len(), 2);
/// ```
pub trait Entity: Send + Sync + 'static {
    /// Returns the static metadata for this entity type.
    fn meta() -> &'static EntityMeta;

    /// Returns the entity name.
    fn entity_name() -> &'static str {
        &Self::meta().name
    }
}

/// The metadata of one entity: its name and persistent fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    /// The entity type name (e.g. `"Person"`).
    pub name: String,
    /// The persistent fields, in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl EntityMeta {
    /// Creates metadata for an entity without fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field owned by this entity.
    #[must_use]
    pub fn with_field(
        mut self,
        field_type: impl Into<String>,
        field_name: impl Into<String>,
        annotations: impl IntoIterator<Item = Annotation>,
    ) -> Self {
        let field = annotations.into_iter().fold(
            FieldDescriptor::new(self.name.clone(), field_type, field_name),
            |field, annotation| field.annotated(annotation),
        );
        self.fields.push(field);
        self
    }

    /// Returns the field with the given name.
    pub fn field(&self, field_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.field_name == field_name)
    }

    /// Returns the fields carrying a join annotation.
    pub fn join_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.has_join_annotation())
    }
}

/// All known entities, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entities: BTreeMap<String, EntityMeta>,
}

impl EntityCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers entity metadata, replacing any entity with the same name.
    pub fn register(&mut self, meta: EntityMeta) {
        tracing::debug!(entity = %meta.name, fields = meta.fields.len(), "Registered entity");
        self.entities.insert(meta.name.clone(), meta);
    }

    /// Registers the static metadata of `E`.
    pub fn register_entity<E: Entity>(&mut self) {
        self.register(E::meta().clone());
    }

    /// Registers the static metadata of `E`, builder style.
    #[must_use]
    pub fn with_entity<E: Entity>(mut self) -> Self {
        self.register_entity::<E>();
        self
    }

    /// Returns the metadata of the named entity.
    ///
    /// # Errors
    ///
    /// Returns [`SearchyError::UnknownEntity`] if the entity is not registered.
    pub fn get(&self, entity_type: &str) -> SearchyResult<&EntityMeta> {
        self.entities
            .get(entity_type)
            .ok_or_else(|| SearchyError::UnknownEntity(entity_type.to_string()))
    }

    /// Returns `true` if the type is a registered entity.
    pub fn is_entity(&self, type_name: &str) -> bool {
        self.entities.contains_key(type_name)
    }

    /// Returns the fields of the named entity.
    ///
    /// # Errors
    ///
    /// Returns [`SearchyError::UnknownEntity`] if the entity is not registered.
    pub fn fields_of(&self, entity_type: &str) -> SearchyResult<&[FieldDescriptor]> {
        self.get(entity_type).map(|meta| meta.fields.as_slice())
    }

    /// Returns one field of the named entity.
    ///
    /// # Errors
    ///
    /// Returns [`SearchyError::UnknownEntity`] or [`SearchyError::UnknownField`].
    pub fn field(&self, entity_type: &str, field_name: &str) -> SearchyResult<&FieldDescriptor> {
        self.get(entity_type)?
            .field(field_name)
            .ok_or_else(|| SearchyError::UnknownField {
                entity: entity_type.to_string(),
                field: field_name.to_string(),
            })
    }

    /// Returns the registered entity names, sorted.
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.keys().map(String::as_str).collect()
    }

    /// Returns every registered entity, sorted by name.
    pub fn entities(&self) -> impl Iterator<Item = &EntityMeta> {
        self.entities.values()
    }

    /// Returns the number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // ── Model files ──────────────────────────────────────────────────

    /// Parses a catalog from a TOML model file.
    ///
    /// # Errors
    ///
    /// Returns [`SearchyError::SerializationError`] on malformed input and
    /// [`SearchyError::ConfigurationError`] on duplicate entities or fields.
    pub fn from_toml_str(content: &str) -> SearchyResult<Self> {
        let file: ModelFile = toml::from_str(content)
            .map_err(|e| SearchyError::SerializationError(format!("TOML parse error: {e}")))?;
        file.into_catalog()
    }

    /// Parses a catalog from a JSON model file.
    ///
    /// # Errors
    ///
    /// Returns [`SearchyError::SerializationError`] on malformed input and
    /// [`SearchyError::ConfigurationError`] on duplicate entities or fields.
    pub fn from_json_str(content: &str) -> SearchyResult<Self> {
        let file: ModelFile = serde_json::from_str(content)
            .map_err(|e| SearchyError::SerializationError(format!("JSON parse error: {e}")))?;
        file.into_catalog()
    }

    /// Loads a catalog from a model file. Files ending in `.json` are parsed
    /// as JSON, everything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`SearchyError::IoError`] if the file cannot be read, or any
    /// error of the format-specific parser.
    pub fn from_file(path: impl AsRef<Path>) -> SearchyResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }
}

#[derive(Deserialize)]
struct ModelFile {
    #[serde(default)]
    entity: Vec<EntityRepr>,
}

#[derive(Deserialize)]
struct EntityRepr {
    name: String,
    #[serde(default)]
    field: Vec<FieldRepr>,
}

#[derive(Deserialize)]
struct FieldRepr {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    annotations: Vec<Annotation>,
}

impl ModelFile {
    fn into_catalog(self) -> SearchyResult<EntityCatalog> {
        let mut catalog = EntityCatalog::new();
        for entity in self.entity {
            if catalog.is_entity(&entity.name) {
                return Err(SearchyError::ConfigurationError(format!(
                    "entity '{}' is declared more than once",
                    entity.name
                )));
            }

            let mut seen = HashSet::new();
            let mut meta = EntityMeta::new(entity.name);
            for field in entity.field {
                if !seen.insert(field.name.clone()) {
                    return Err(SearchyError::ConfigurationError(format!(
                        "field '{}' is declared more than once on entity '{}'",
                        field.name, meta.name
                    )));
                }
                meta = meta.with_field(field.field_type, field.name, field.annotations);
            }
            catalog.register(meta);
        }
        Ok(catalog)
    }
}
