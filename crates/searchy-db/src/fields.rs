//! Field descriptors and persistence-mapping annotations.
//!
//! A [`FieldDescriptor`] describes one persistent field of an entity together
//! with the set of mapping markers ([`Annotation`]s) declared on it. The
//! descriptors are produced once, when entity metadata is registered, and are
//! read-only afterwards: join handlers only ever test annotation membership.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a persistence-mapping marker that makes a field joinable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationKind {
    /// A collection of simple values stored in an auxiliary table.
    ElementCollection,
    /// A collection of entities owned through a foreign key on the other side.
    OneToMany,
    /// A collection of entities related through a join table.
    ManyToMany,
    /// A single related entity with a unique relationship.
    OneToOne,
    /// A single related entity referenced through a foreign key.
    ManyToOne,
}

impl AnnotationKind {
    /// Every annotation kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::ElementCollection,
        Self::OneToMany,
        Self::ManyToMany,
        Self::OneToOne,
        Self::ManyToOne,
    ];

    /// Returns the textual marker for this kind (e.g. `"element-collection"`).
    pub const fn marker(&self) -> &'static str {
        match self {
            Self::ElementCollection => "element-collection",
            Self::OneToMany => "one-to-many",
            Self::ManyToMany => "many-to-many",
            Self::OneToOne => "one-to-one",
            Self::ManyToOne => "many-to-one",
        }
    }

    /// Parses a textual marker into its kind.
    pub fn from_marker(marker: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.marker() == marker)
    }

    /// Returns the fetch type used when the mapping does not declare one.
    ///
    /// Collection mappings are lazy and single-valued associations are eager.
    pub const fn default_fetch(&self) -> FetchType {
        match self {
            Self::ElementCollection | Self::OneToMany | Self::ManyToMany => FetchType::Lazy,
            Self::OneToOne | Self::ManyToOne => FetchType::Eager,
        }
    }

    /// Returns `true` if the mapping holds a collection.
    pub const fn is_collection(&self) -> bool {
        matches!(
            self,
            Self::ElementCollection | Self::OneToMany | Self::ManyToMany
        )
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Whether a related value is loaded together with its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchType {
    /// Loaded in the same round-trip as the owner.
    Eager,
    /// Loaded on first access.
    #[default]
    Lazy,
}

/// A persistence-mapping marker present on a field.
///
/// Deserializes either from a bare marker string (`"one-to-many"`) or from a
/// table with an explicit fetch type (`{ kind = "element-collection", fetch = "eager" }`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "AnnotationRepr")]
pub struct Annotation {
    /// The kind of mapping.
    pub kind: AnnotationKind,
    /// The declared fetch type, if any.
    pub fetch: Option<FetchType>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnnotationRepr {
    Marker(AnnotationKind),
    Full {
        kind: AnnotationKind,
        #[serde(default)]
        fetch: Option<FetchType>,
    },
}

impl From<AnnotationRepr> for Annotation {
    fn from(repr: AnnotationRepr) -> Self {
        match repr {
            AnnotationRepr::Marker(kind) => Self::new(kind),
            AnnotationRepr::Full { kind, fetch } => Self { kind, fetch },
        }
    }
}

impl Annotation {
    /// Creates a marker without an explicit fetch type.
    pub const fn new(kind: AnnotationKind) -> Self {
        Self { kind, fetch: None }
    }

    /// Creates a marker with an explicit fetch type.
    pub const fn with_fetch(kind: AnnotationKind, fetch: FetchType) -> Self {
        Self {
            kind,
            fetch: Some(fetch),
        }
    }

    /// Shorthand for an `ElementCollection` marker.
    pub const fn element_collection() -> Self {
        Self::new(AnnotationKind::ElementCollection)
    }

    /// Shorthand for a `OneToMany` marker.
    pub const fn one_to_many() -> Self {
        Self::new(AnnotationKind::OneToMany)
    }

    /// Shorthand for a `ManyToMany` marker.
    pub const fn many_to_many() -> Self {
        Self::new(AnnotationKind::ManyToMany)
    }

    /// Shorthand for a `OneToOne` marker.
    pub const fn one_to_one() -> Self {
        Self::new(AnnotationKind::OneToOne)
    }

    /// Shorthand for a `ManyToOne` marker.
    pub const fn many_to_one() -> Self {
        Self::new(AnnotationKind::ManyToOne)
    }

    /// Returns the effective fetch type: the declared one, or the kind's default.
    pub const fn fetch_type(&self) -> FetchType {
        match self.fetch {
            Some(fetch) => fetch,
            None => self.kind.default_fetch(),
        }
    }
}

impl From<AnnotationKind> for Annotation {
    fn from(kind: AnnotationKind) -> Self {
        Self::new(kind)
    }
}

/// The shape of a field's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// A single value or a single related entity.
    #[default]
    Plain,
    /// A set of values.
    Set,
    /// An ordered list of values.
    List,
    /// Any other collection (including arrays).
    Collection,
    /// A keyed map of values.
    Map,
}

/// Describes one persistent field under consideration for joining.
///
/// # Examples
///
/// ```
/// use searchy_db::fields::{Annotation, AnnotationKind, FieldDescriptor};
///
/// let field = FieldDescriptor::new("Person", "Set<String>", "nickNames")
///     .annotated(Annotation::element_collection());
/// assert!(field.has_annotation(AnnotationKind::ElementCollection));
/// assert_eq!(field.target_type(), Some("String"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// The owning entity type.
    pub entity_type: String,
    /// The declared type of the field (e.g. `"Set<Address>"`).
    pub field_type: String,
    /// The field name, unique within the owning entity.
    pub field_name: String,
    /// The persistence-mapping markers present on the field.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl FieldDescriptor {
    /// Creates a field descriptor without annotations.
    pub fn new(
        entity_type: impl Into<String>,
        field_type: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            field_type: field_type.into(),
            field_name: field_name.into(),
            annotations: Vec::new(),
        }
    }

    /// Adds an annotation, replacing any existing annotation of the same kind.
    #[must_use]
    pub fn annotated(mut self, annotation: impl Into<Annotation>) -> Self {
        let annotation = annotation.into();
        if let Some(existing) = self
            .annotations
            .iter_mut()
            .find(|a| a.kind == annotation.kind)
        {
            *existing = annotation;
        } else {
            self.annotations.push(annotation);
        }
        self
    }

    /// Returns `true` if an annotation of the given kind is present.
    pub fn has_annotation(&self, kind: AnnotationKind) -> bool {
        self.annotations.iter().any(|a| a.kind == kind)
    }

    /// Returns the annotation of the given kind, if present.
    pub fn annotation(&self, kind: AnnotationKind) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.kind == kind)
    }

    /// Returns `true` if the field carries any join annotation.
    pub fn has_join_annotation(&self) -> bool {
        !self.annotations.is_empty()
    }

    /// Returns the name identifying the join for this field
    /// (`<EntityType>.<fieldName>`).
    pub fn join_name(&self) -> String {
        format!("{}.{}", self.entity_type, self.field_name)
    }

    /// Returns the shape of the declared field type.
    pub fn element_type(&self) -> ElementType {
        parse_field_type(&self.field_type).0
    }

    /// Returns the type reached by traversing this field: the element type of
    /// a collection, the value type of a map, or the field type itself.
    pub fn target_type(&self) -> Option<&str> {
        parse_field_type(&self.field_type).1
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.entity_type, self.field_name, self.field_type)
    }
}

/// Splits a declared type such as `Map<String, Feature>` into its shape and
/// the type reached by traversing it.
pub fn parse_field_type(field_type: &str) -> (ElementType, Option<&str>) {
    let field_type = field_type.trim();
    if field_type.is_empty() {
        return (ElementType::Plain, None);
    }

    if let Some(component) = field_type.strip_suffix("[]") {
        return (ElementType::Collection, Some(component.trim()));
    }

    let (Some(open), true) = (field_type.find('<'), field_type.ends_with('>')) else {
        return (ElementType::Plain, Some(field_type));
    };

    let outer = field_type[..open].trim();
    let outer = outer.rsplit(['.', ':']).next().unwrap_or(outer);
    let args = split_type_args(&field_type[open + 1..field_type.len() - 1]);

    match outer.to_ascii_lowercase().as_str() {
        "set" | "hashset" | "btreeset" | "sortedset" => (ElementType::Set, args.first().copied()),
        "list" | "vec" | "vecdeque" | "arraylist" => (ElementType::List, args.first().copied()),
        "collection" | "iterable" => (ElementType::Collection, args.first().copied()),
        "map" | "hashmap" | "btreemap" | "sortedmap" => (ElementType::Map, args.last().copied()),
        "option" | "optional" => match args.first() {
            Some(inner) => parse_field_type(inner),
            None => (ElementType::Plain, None),
        },
        _ => (ElementType::Plain, Some(field_type)),
    }
}

/// Splits generic arguments on top-level commas.
fn split_type_args(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = args[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}
