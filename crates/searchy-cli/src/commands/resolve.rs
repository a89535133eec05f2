//! The `resolve` management command.
//!
//! Runs one field of an entity model through an ordered list of join handlers
//! and prints the first-match decision.

use std::fmt;
use std::sync::Arc;

use searchy_core::{SearchyError, SearchyResult, Settings};
use searchy_db::join::{EntityJoinHandler, JoinDecision, JoinHandlerChain};
use searchy_db::model::EntityCatalog;
use serde::Serialize;

use super::{configured_handlers, handler_arg, json_arg, load_catalog, models_arg};
use crate::command::ManagementCommand;

/// Prints the join decision for a single field.
pub struct ResolveCommand;

/// The outcome of resolving one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveReport {
    /// The owning entity type.
    pub entity: String,
    /// The resolved field.
    pub field: String,
    /// The name of the deciding handler, if any handler matched.
    pub handler: Option<String>,
    /// The decision, if any handler matched.
    pub decision: Option<JoinDecision>,
}

impl fmt::Display for ResolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: ", self.entity, self.field)?;
        match (&self.handler, &self.decision) {
            (Some(handler), Some(decision)) => write!(f, "{decision} ({handler})"),
            _ => f.write_str("no resolver matched"),
        }
    }
}

/// Resolves `entity.field` against `handlers`, first match wins.
///
/// Only the given handlers take part; no default handler is appended, so a
/// field may come back unmatched.
///
/// # Errors
///
/// Returns [`SearchyError::UnknownEntity`] or [`SearchyError::UnknownField`]
/// for a field missing from the catalog, or the deciding handler's error.
pub fn resolve_field(
    catalog: &EntityCatalog,
    entity: &str,
    field: &str,
    handlers: Vec<Arc<dyn EntityJoinHandler>>,
) -> SearchyResult<ResolveReport> {
    let descriptor = catalog.field(entity, field)?;

    let mut chain = JoinHandlerChain::new();
    for handler in handlers {
        chain.push(handler);
    }

    let resolution = chain.resolve(descriptor)?;

    Ok(ResolveReport {
        entity: entity.to_string(),
        field: field.to_string(),
        handler: resolution
            .handler_index()
            .map(|index| chain.handlers()[index].name().to_string()),
        decision: resolution.decision(),
    })
}

impl ManagementCommand for ResolveCommand {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn help(&self) -> &'static str {
        "Print the join decision for one field"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(models_arg())
            .arg(clap::Arg::new("entity").required(true).help("Entity type name"))
            .arg(clap::Arg::new("field").required(true).help("Field name"))
            .arg(handler_arg())
            .arg(json_arg())
    }

    fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> SearchyResult<()> {
        let catalog = load_catalog(matches)?;
        let handlers = configured_handlers(settings, matches)?;
        let entity = matches.get_one::<String>("entity").map_or("", String::as_str);
        let field = matches.get_one::<String>("field").map_or("", String::as_str);

        let report = resolve_field(&catalog, entity, field, handlers)?;

        if matches.get_flag("json") {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| SearchyError::SerializationError(e.to_string()))?;
            println!("{json}");
        } else {
            println!("{report}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use searchy_db::fields::Annotation;
    use searchy_db::join::{handler_by_name, JoinKind};
    use searchy_db::model::EntityMeta;

    use super::*;

    fn catalog() -> EntityCatalog {
        let mut catalog = EntityCatalog::new();
        catalog.register(
            EntityMeta::new("Person")
                .with_field("Set<String>", "nickNames", [Annotation::element_collection()]),
        );
        catalog.register(
            EntityMeta::new("Vehicle").with_field("Person", "person", [Annotation::many_to_one()]),
        );
        catalog
    }

    fn handlers(names: &[&str]) -> Vec<Arc<dyn EntityJoinHandler>> {
        names.iter().map(|n| handler_by_name(n).unwrap()).collect()
    }

    #[test]
    fn test_resolve_element_collection() {
        let report = resolve_field(
            &catalog(),
            "Person",
            "nickNames",
            handlers(&["element-collection", "default"]),
        )
        .unwrap();
        assert_eq!(report.handler.as_deref(), Some("element-collection"));
        assert_eq!(report.decision, Some(JoinDecision::LEFT_FETCH));
        assert_eq!(
            report.to_string(),
            "Person.nickNames: left join fetch (element-collection)"
        );
    }

    #[test]
    fn test_resolve_no_match() {
        let report = resolve_field(
            &catalog(),
            "Vehicle",
            "person",
            handlers(&["element-collection"]),
        )
        .unwrap();
        assert!(report.handler.is_none());
        assert_eq!(report.to_string(), "Vehicle.person: no resolver matched");
    }

    #[test]
    fn test_resolve_unknown_field() {
        let err = resolve_field(&catalog(), "Person", "age", Vec::new()).unwrap_err();
        assert!(matches!(err, SearchyError::UnknownField { .. }));
    }

    #[test]
    fn test_report_json() {
        let report = resolve_field(
            &catalog(),
            "Vehicle",
            "person",
            handlers(&["default"]),
        )
        .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["handler"], "default");
        assert_eq!(json["decision"]["join_kind"], "left");
        assert_eq!(report.decision.map(|d| d.join_kind), Some(JoinKind::Left));
    }
}
