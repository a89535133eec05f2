//! Sample entities: a person with addresses, a job, and vehicles.
//!
//! Each struct carries its data as plain Rust fields and describes its
//! persistent fields to searchy through [`Entity::meta`].

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use searchy_db::fields::{Annotation, AnnotationKind, FetchType};
use searchy_db::model::{Entity, EntityCatalog, EntityMeta};

/// A person.
#[derive(Debug, Clone, Default)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub birthday: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub nick_names: HashSet<String>,
    pub phone_numbers: HashSet<String>,
    pub address_entities: Vec<Address>,
    pub job_entity: Option<Job>,
    pub vehicles: Vec<Vehicle>,
    pub characteristics: HashMap<String, String>,
}

impl Entity for Person {
    fn meta() -> &'static EntityMeta {
        static META: LazyLock<EntityMeta> = LazyLock::new(|| {
            EntityMeta::new("Person")
                .with_field("String", "firstName", [])
                .with_field("String", "lastName", [])
                .with_field("String", "email", [])
                .with_field("LocalDate", "birthday", [])
                .with_field("Double", "height", [])
                .with_field("Double", "weight", [])
                .with_field(
                    "Set<String>",
                    "nickNames",
                    [Annotation::with_fetch(
                        AnnotationKind::ElementCollection,
                        FetchType::Eager,
                    )],
                )
                .with_field("Set<String>", "phoneNumbers", [Annotation::element_collection()])
                .with_field("Set<Address>", "addressEntities", [Annotation::many_to_many()])
                .with_field("Job", "jobEntity", [Annotation::one_to_one()])
                .with_field("Set<Vehicle>", "vehicles", [Annotation::one_to_many()])
                .with_field(
                    "Map<String, String>",
                    "characteristics",
                    [Annotation::element_collection()],
                )
        });
        &META
    }
}

/// A postal address shared by several persons.
#[derive(Debug, Clone, Default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

impl Entity for Address {
    fn meta() -> &'static EntityMeta {
        static META: LazyLock<EntityMeta> = LazyLock::new(|| {
            EntityMeta::new("Address")
                .with_field("String", "street", [])
                .with_field("String", "city", [])
                .with_field("String", "zipCode", [])
                .with_field("String", "country", [])
                .with_field("Set<Person>", "persons", [Annotation::many_to_many()])
        });
        &META
    }
}

/// A person's job.
#[derive(Debug, Clone, Default)]
pub struct Job {
    pub active: bool,
    pub title: String,
    pub company: String,
    pub salary: i32,
    pub hire_date: Option<String>,
}

impl Entity for Job {
    fn meta() -> &'static EntityMeta {
        static META: LazyLock<EntityMeta> = LazyLock::new(|| {
            EntityMeta::new("Job")
                .with_field("Boolean", "active", [])
                .with_field("String", "title", [])
                .with_field("String", "company", [])
                .with_field("Int", "salary", [])
                .with_field("OffsetDateTime", "hireDate", [])
                .with_field("Person", "person", [Annotation::one_to_one()])
        });
        &META
    }
}

/// The kind of a vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VehicleType {
    #[default]
    Car,
    Motorbike,
    Scooter,
}

/// A vehicle owned by a person.
#[derive(Debug, Clone, Default)]
pub struct Vehicle {
    pub vehicle_type: VehicleType,
    pub brand: String,
    pub model: String,
    pub features: HashMap<String, Feature>,
}

impl Entity for Vehicle {
    fn meta() -> &'static EntityMeta {
        static META: LazyLock<EntityMeta> = LazyLock::new(|| {
            EntityMeta::new("Vehicle")
                .with_field("VehicleType", "vehicleType", [])
                .with_field("String", "brand", [])
                .with_field("String", "model", [])
                .with_field("Person", "person", [Annotation::many_to_one()])
                .with_field("Map<String, Feature>", "features", [Annotation::one_to_many()])
        });
        &META
    }
}

/// An optional feature of a vehicle.
#[derive(Debug, Clone, Default)]
pub struct Feature {
    pub name: String,
    pub description: String,
    pub metadata: HashMap<String, String>,
}

impl Entity for Feature {
    fn meta() -> &'static EntityMeta {
        static META: LazyLock<EntityMeta> = LazyLock::new(|| {
            EntityMeta::new("Feature")
                .with_field("String", "name", [])
                .with_field("String", "description", [])
                .with_field("Map<String, String>", "metadata", [Annotation::element_collection()])
        });
        &META
    }
}

/// Builds the catalog of every sample entity.
pub fn sample_catalog() -> EntityCatalog {
    EntityCatalog::new()
        .with_entity::<Person>()
        .with_entity::<Address>()
        .with_entity::<Job>()
        .with_entity::<Vehicle>()
        .with_entity::<Feature>()
}
