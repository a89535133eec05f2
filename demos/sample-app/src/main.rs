//! # searchy-rs Sample Application
//!
//! A small application demonstrating the searchy-rs pipeline:
//!
//! - **Models**: `Person`, `Address`, `Job`, `Vehicle`, and `Feature` implementing `Entity`
//! - **Handlers**: A custom join handler fetching set element collections
//! - **Configuration**: A `SearchConfigurer` registering the searchable roots
//! - **Settings**: Configurable via TOML or programmatic defaults
//! - **CLI**: The `check` management command run against `models.toml`
//!
//! ## Running
//!
//! ```bash
//! cargo run --package sample-app
//! ```

mod config;
mod handlers;
mod models;
mod settings;

use std::sync::Arc;

use searchy_cli::command::CommandRegistry;
use searchy_cli::commands::register_builtin_commands;
use searchy_cli::{resolve_field, run_checks};
use searchy_core::logging::setup_logging;
use searchy_core::{SearchyError, SearchyResult, Settings};
use searchy_db::descriptor::DescriptorRegistry;
use searchy_db::join::{handler_by_name, EntityJoinManager, JoinClauseBuilder};
use searchy_db::model::EntityCatalog;

use config::SampleAppConfiguration;
use models::sample_catalog;
use settings::load_settings;

const MODELS_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/models.toml");

fn main() {
    let settings = load_settings("sample.toml");
    setup_logging(&settings);
    tracing::info!(
        root_alias = %settings.root_alias,
        handlers = ?settings.default_join_handlers,
        "Sample app configured"
    );

    let catalog = Arc::new(sample_catalog());

    let mut registry = DescriptorRegistry::new();
    if let Err(e) = registry.configure(&SampleAppConfiguration) {
        tracing::error!("Search configuration failed: {e}");
        return;
    }

    demonstrate_joins(&catalog, &registry, &settings);
    demonstrate_paths(&catalog, &registry, &settings);
    demonstrate_resolution(&catalog, &settings);
    demonstrate_checks(&catalog, &settings);

    tracing::info!("Sample app complete!");
}

/// Renders the join clause of the descriptor registered under `id`.
fn join_clause(
    manager: &EntityJoinManager,
    registry: &DescriptorRegistry,
    id: &str,
    root_alias: &str,
) -> SearchyResult<String> {
    let descriptor = registry
        .get(id)
        .ok_or_else(|| SearchyError::InvalidState(format!("no search descriptor '{id}'")))?;
    let joins = manager.compute_entity_joins(&descriptor)?;

    let mut builder = JoinClauseBuilder::new(root_alias);
    builder.extend(joins.joins());
    Ok(builder.render())
}

/// Demonstrates join computation for every registered search.
fn demonstrate_joins(catalog: &Arc<EntityCatalog>, registry: &DescriptorRegistry, settings: &Settings) {
    tracing::info!("--- Entity Joins ---");

    let manager = EntityJoinManager::from_settings(Arc::clone(catalog), settings);
    for id in registry.descriptor_ids() {
        match join_clause(&manager, registry, id, &settings.root_alias) {
            Ok(clause) => tracing::info!("  {id}: {clause}"),
            Err(e) => tracing::warn!("  {id}: {e}"),
        }
    }

    if let Some(joins) = manager.cached("person") {
        let fetched: Vec<&str> = joins.fetched().iter().map(|j| j.field_path.as_str()).collect();
        tracing::info!("  person fetches {fetched:?}");
        match serde_json::to_string(joins.joins()) {
            Ok(json) => tracing::debug!("  person joins: {json}"),
            Err(e) => tracing::warn!("  person joins: {e}"),
        }
        for failure in joins.failures() {
            tracing::warn!("  {}: {}", failure.field_path, failure.error);
        }
    }

    // Recomputing after a clear reuses the cached decisions.
    manager.clear();
    if let Some(id) = registry.descriptor_ids().first() {
        if let Err(e) = join_clause(&manager, registry, id, &settings.root_alias) {
            tracing::warn!("  {id}: {e}");
        }
        match manager.decision_cache(id) {
            Some(cache) => tracing::info!("  {id}: {} cached decision(s)", cache.len()),
            None => tracing::info!("  {id}: decision caching disabled"),
        }
    }
}

/// Demonstrates the joins needed to traverse a single field path.
fn demonstrate_paths(catalog: &Arc<EntityCatalog>, registry: &DescriptorRegistry, settings: &Settings) {
    tracing::info!("\n--- Field Paths ---");

    let manager = EntityJoinManager::from_settings(Arc::clone(catalog), settings);
    let Some(descriptor) = registry.get("person") else {
        return;
    };
    let joins = match manager.compute_entity_joins(&descriptor) {
        Ok(joins) => joins,
        Err(e) => {
            tracing::warn!("  person: {e}");
            return;
        }
    };

    for path in ["firstName", "vehicles.brand", "vehicles.features.metadata"] {
        let needed = joins.joins_for_path(path);
        let mut builder = JoinClauseBuilder::new(settings.root_alias.as_str());
        builder.extend(&needed);
        tracing::info!("  {path} -> {} join(s): {}", needed.len(), builder.render());
    }
}

/// Demonstrates first-match resolution with the handlers named in the settings.
fn demonstrate_resolution(catalog: &EntityCatalog, settings: &Settings) {
    tracing::info!("\n--- Field Resolution ---");

    let handlers: SearchyResult<Vec<_>> = settings
        .default_join_handlers
        .iter()
        .map(String::as_str)
        .map(handler_by_name)
        .collect();
    let handlers = match handlers {
        Ok(handlers) => handlers,
        Err(e) => {
            tracing::warn!("  {e}");
            return;
        }
    };

    for (entity, field) in [("Person", "jobEntity"), ("Person", "vehicles"), ("Vehicle", "person")] {
        match resolve_field(catalog, entity, field, handlers.clone()) {
            Ok(report) => tracing::info!("  {report}"),
            Err(e) => tracing::warn!("  {entity}.{field}: {e}"),
        }
    }
}

/// Demonstrates the model checks, in code and through the `check` command.
fn demonstrate_checks(catalog: &EntityCatalog, settings: &Settings) {
    tracing::info!("\n--- Model Checks ---");

    let messages = run_checks(catalog, settings);
    tracing::info!("  {} issue(s) in the sample entities", messages.len());

    let mut commands = CommandRegistry::new();
    register_builtin_commands(&mut commands);

    match commands
        .build_cli()
        .try_get_matches_from(["searchy", "check", MODELS_FILE])
    {
        Ok(matches) => match commands.execute(&matches, settings) {
            Ok(()) => tracing::info!("Model check passed!"),
            Err(e) => tracing::warn!("Model check: {e}"),
        },
        Err(e) => tracing::warn!("Model check arguments: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (EntityJoinManager, DescriptorRegistry) {
        let mut registry = DescriptorRegistry::new();
        registry.configure(&SampleAppConfiguration).unwrap();
        (EntityJoinManager::new(Arc::new(sample_catalog())), registry)
    }

    #[test]
    fn test_person_join_clause() {
        let (manager, registry) = setup();
        assert_eq!(
            join_clause(&manager, &registry, "person", "p").unwrap(),
            "LEFT JOIN FETCH p.nickNames j1 LEFT JOIN FETCH p.phoneNumbers j2 \
             LEFT JOIN p.addressEntities j3 LEFT JOIN p.jobEntity j4 LEFT JOIN p.vehicles j5 \
             LEFT JOIN j5.features j6 LEFT JOIN j6.metadata j7 LEFT JOIN p.characteristics j8"
        );
    }

    #[test]
    fn test_person_decisions_survive_clear() {
        let (manager, registry) = setup();
        let first = join_clause(&manager, &registry, "person", "p").unwrap();
        manager.clear();
        assert_eq!(join_clause(&manager, &registry, "person", "p").unwrap(), first);
        assert_eq!(manager.decision_cache("person").unwrap().len(), 8);
    }

    #[test]
    fn test_unknown_descriptor() {
        let (manager, registry) = setup();
        assert!(matches!(
            join_clause(&manager, &registry, "garage", "g"),
            Err(SearchyError::InvalidState(_))
        ));
    }

    #[test]
    fn test_models_file_matches_entities() {
        let from_file = EntityCatalog::from_file(MODELS_FILE).unwrap();
        let in_code = sample_catalog();
        assert_eq!(from_file.entity_names(), in_code.entity_names());
        for entity in in_code.entities() {
            assert_eq!(from_file.get(&entity.name).unwrap(), entity);
        }
        assert!(run_checks(&from_file, &Settings::default()).is_empty());
    }
}
