//! The `joins` management command.
//!
//! Computes the joins of a root entity the way a search over it would, then
//! prints each join and the rendered join clause.

use std::sync::Arc;

use searchy_core::{SearchyError, SearchyResult, Settings};
use searchy_db::descriptor::{DescriptorOption, SearchDescriptor};
use searchy_db::join::{
    EntityJoin, EntityJoinHandler, EntityJoinManager, JoinClauseBuilder, JoinFailure,
};
use searchy_db::model::EntityCatalog;
use serde::Serialize;

use super::{configured_handlers, handler_arg, json_arg, load_catalog, models_arg};
use crate::command::ManagementCommand;

/// Prints the computed joins of a root entity.
pub struct JoinsCommand;

/// The joins computed for one root entity.
#[derive(Debug, Clone, Serialize)]
pub struct JoinsReport {
    /// The descriptor id.
    pub id: String,
    /// The root entity type.
    pub entity: String,
    /// The joins, in discovery order (or traversal order with a path).
    pub joins: Vec<EntityJoin>,
    /// Fields whose join could not be decided.
    pub failures: Vec<JoinFailure>,
    /// The rendered join clause.
    pub clause: String,
}

/// Computes the joins of `entity` with the given handlers.
///
/// Clauses start from `alias`, or from `settings.root_alias` without one.
/// When `path` is given only the joins needed to traverse it are reported.
///
/// # Errors
///
/// Returns [`SearchyError::UnknownEntity`] for an entity missing from the
/// catalog.
pub fn compute_joins(
    catalog: EntityCatalog,
    entity: &str,
    handlers: Vec<Arc<dyn EntityJoinHandler>>,
    settings: &Settings,
    alias: Option<&str>,
    path: Option<&str>,
) -> SearchyResult<JoinsReport> {
    let options = handlers.into_iter().map(DescriptorOption::JoinHandler);
    let descriptor = SearchDescriptor::new(entity, options);

    let manager = EntityJoinManager::from_settings(Arc::new(catalog), settings);
    let computed = manager.compute_entity_joins(&descriptor)?;

    let joins = match path {
        Some(path) => computed.joins_for_path(path),
        None => computed.joins().to_vec(),
    };

    let mut builder = JoinClauseBuilder::new(alias.unwrap_or(&settings.root_alias));
    builder.extend(&joins);

    Ok(JoinsReport {
        id: descriptor.id().to_string(),
        entity: descriptor.entity_type().to_string(),
        clause: builder.render(),
        joins,
        failures: computed.failures().to_vec(),
    })
}

impl ManagementCommand for JoinsCommand {
    fn name(&self) -> &'static str {
        "joins"
    }

    fn help(&self) -> &'static str {
        "Print the computed joins of a root entity"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(models_arg())
            .arg(clap::Arg::new("entity").required(true).help("Root entity type name"))
            .arg(handler_arg())
            .arg(
                clap::Arg::new("alias")
                    .long("alias")
                    .help("Alias of the root entity (defaults to the root_alias setting)"),
            )
            .arg(
                clap::Arg::new("path")
                    .long("path")
                    .help("Only print the joins needed to traverse this field path"),
            )
            .arg(json_arg())
    }

    fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> SearchyResult<()> {
        let catalog = load_catalog(matches)?;
        let handlers = configured_handlers(settings, matches)?;
        let entity = matches.get_one::<String>("entity").map_or("", String::as_str);
        let alias = matches.get_one::<String>("alias").map(String::as_str);
        let path = matches.get_one::<String>("path").map(String::as_str);

        let report = compute_joins(catalog, entity, handlers, settings, alias, path)?;

        if matches.get_flag("json") {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| SearchyError::SerializationError(e.to_string()))?;
            println!("{json}");
            return Ok(());
        }

        println!("{} ({}): {} join(s)", report.entity, report.id, report.joins.len());
        for join in &report.joins {
            println!(
                "  {:<32} {:<28} {}{}",
                join.field_path,
                join.join_name,
                join.join_kind,
                if join.fetched { " fetch" } else { "" }
            );
        }
        for failure in &report.failures {
            println!(
                "  {:<32} {:<28} failed: {}",
                failure.field_path, failure.join_name, failure.error
            );
        }
        if !report.clause.is_empty() {
            println!("{}", report.clause);
        }
        Ok(())
    }
}
