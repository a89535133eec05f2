//! The `check` management command.
//!
//! Loads an entity model file and reports mapping problems that would make
//! join computation misleading: associations pointing at unknown entities,
//! collection mappings on single-valued fields and the reverse, and default
//! join handlers that do not exist.

use searchy_core::{SearchyError, SearchyResult, Settings};
use searchy_db::fields::{AnnotationKind, ElementType};
use searchy_db::join::handler_by_name;
use searchy_db::model::EntityCatalog;

use super::{load_catalog, models_arg};
use crate::command::ManagementCommand;

/// Validates an entity model file.
pub struct CheckCommand;

/// The result of a single model check.
#[derive(Debug, Clone)]
pub struct CheckMessage {
    /// The severity level of this check result.
    pub level: CheckLevel,
    /// A human-readable description of the issue.
    pub msg: String,
    /// An optional hint for how to resolve the issue.
    pub hint: Option<String>,
    /// A unique identifier for this check (e.g. "models.E001").
    pub id: String,
}

/// Severity levels for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckLevel {
    /// Informational message.
    Info,
    /// A warning that may indicate a problem.
    Warning,
    /// An error that must be resolved.
    Error,
}

impl std::fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Runs the model checks against a catalog and the settings.
pub fn run_checks(catalog: &EntityCatalog, settings: &Settings) -> Vec<CheckMessage> {
    let mut messages = Vec::new();

    for name in &settings.default_join_handlers {
        if handler_by_name(name).is_err() {
            messages.push(CheckMessage {
                level: CheckLevel::Error,
                msg: format!("Unknown default join handler '{name}'"),
                hint: Some("Use one of the built-in join handler names".to_string()),
                id: "settings.E001".to_string(),
            });
        }
    }

    for entity in catalog.entities() {
        if entity.fields.is_empty() {
            messages.push(CheckMessage {
                level: CheckLevel::Info,
                msg: format!("Entity '{}' declares no fields", entity.name),
                hint: None,
                id: "models.I001".to_string(),
            });
        }

        for field in entity.join_fields() {
            let is_collection_type = field.element_type() != ElementType::Plain;

            for annotation in &field.annotations {
                let kind = annotation.kind;

                if kind != AnnotationKind::ElementCollection {
                    let target = field.target_type().unwrap_or_default();
                    if !catalog.is_entity(target) {
                        messages.push(CheckMessage {
                            level: CheckLevel::Error,
                            msg: format!(
                                "{} is mapped {kind} but '{target}' is not a registered entity",
                                field.join_name()
                            ),
                            hint: Some(format!("Declare an entity named '{target}'")),
                            id: "models.E001".to_string(),
                        });
                    }
                }

                if kind.is_collection() && !is_collection_type {
                    messages.push(CheckMessage {
                        level: CheckLevel::Warning,
                        msg: format!(
                            "{} is mapped {kind} but its type '{}' is not a collection",
                            field.join_name(),
                            field.field_type
                        ),
                        hint: Some("Use a Set, List, Collection, or Map type".to_string()),
                        id: "models.W001".to_string(),
                    });
                } else if !kind.is_collection() && is_collection_type {
                    messages.push(CheckMessage {
                        level: CheckLevel::Warning,
                        msg: format!(
                            "{} is mapped {kind} but its type '{}' is a collection",
                            field.join_name(),
                            field.field_type
                        ),
                        hint: Some("Use a one-to-many or many-to-many mapping".to_string()),
                        id: "models.W002".to_string(),
                    });
                }
            }
        }
    }

    messages
}

impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Validate an entity model file"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(models_arg()).arg(
            clap::Arg::new("fail-level")
                .long("fail-level")
                .value_parser(["ERROR", "WARNING"])
                .default_value("ERROR")
                .help("Message level that makes the check fail"),
        )
    }

    fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> SearchyResult<()> {
        let catalog = load_catalog(matches)?;
        let fail_level = match matches.get_one::<String>("fail-level").map(String::as_str) {
            Some("WARNING") => CheckLevel::Warning,
            _ => CheckLevel::Error,
        };

        let field_count: usize = catalog.entities().map(|e| e.fields.len()).sum();
        println!(
            "Loaded {} entities with {} fields",
            catalog.len(),
            field_count
        );

        let messages = run_checks(&catalog, settings);
        if messages.is_empty() {
            println!("Model check identified no issues");
            return Ok(());
        }

        for msg in &messages {
            let hint_text = msg
                .hint
                .as_ref()
                .map_or(String::new(), |h| format!("\n\tHINT: {h}"));
            println!("{} ({}): {}{}", msg.level, msg.id, msg.msg, hint_text);
        }

        let failing = messages.iter().filter(|m| m.level >= fail_level).count();
        tracing::info!(
            issues = messages.len(),
            failing,
            "Model check finished"
        );

        if failing > 0 {
            return Err(SearchyError::ConfigurationError(format!(
                "Model check found {failing} issue(s) at level {fail_level} or above"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use searchy_db::fields::Annotation;
    use searchy_db::model::EntityMeta;

    use super::*;

    fn catalog() -> EntityCatalog {
        let mut catalog = EntityCatalog::new();
        catalog.register(
            EntityMeta::new("Person")
                .with_field("String", "firstName", [])
                .with_field("Set<String>", "nickNames", [Annotation::element_collection()])
                .with_field("Set<Vehicle>", "vehicles", [Annotation::one_to_many()]),
        );
        catalog.register(
            EntityMeta::new("Vehicle")
                .with_field("Person", "person", [Annotation::many_to_one()]),
        );
        catalog
    }

    #[test]
    fn test_clean_catalog_has_no_issues() {
        assert!(run_checks(&catalog(), &Settings::default()).is_empty());
    }

    #[test]
    fn test_unknown_target_entity() {
        let mut catalog = catalog();
        catalog.register(
            EntityMeta::new("Job").with_field("Company", "company", [Annotation::many_to_one()]),
        );
        let messages = run_checks(&catalog, &Settings::default());
        let error = messages.iter().find(|m| m.id == "models.E001").unwrap();
        assert_eq!(error.level, CheckLevel::Error);
        assert!(error.msg.contains("Job.company"));
        assert!(error.msg.contains("'Company'"));
    }

    #[test]
    fn test_collection_mapping_on_plain_field() {
        let mut catalog = catalog();
        catalog.register(
            EntityMeta::new("Feature").with_field("String", "tags", [Annotation::element_collection()]),
        );
        let messages = run_checks(&catalog, &Settings::default());
        assert!(messages.iter().any(|m| m.id == "models.W001"));
    }

    #[test]
    fn test_single_valued_mapping_on_collection() {
        let mut catalog = catalog();
        catalog.register(
            EntityMeta::new("Garage").with_field("Set<Vehicle>", "vehicles", [Annotation::many_to_one()]),
        );
        let messages = run_checks(&catalog, &Settings::default());
        assert!(messages.iter().any(|m| m.id == "models.W002"));
    }

    #[test]
    fn test_empty_entity_is_info() {
        let mut catalog = catalog();
        catalog.register(EntityMeta::new("Empty"));
        let messages = run_checks(&catalog, &Settings::default());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, CheckLevel::Info);
    }

    #[test]
    fn test_unknown_default_handler() {
        let settings = Settings {
            default_join_handlers: vec!["element-collection".into(), "eager".into()],
            ..Settings::default()
        };
        let messages = run_checks(&catalog(), &settings);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, "settings.E001");
        assert!(messages[0].msg.contains("'eager'"));
    }

    #[test]
    fn test_check_level_ordering() {
        assert!(CheckLevel::Info < CheckLevel::Warning);
        assert!(CheckLevel::Warning < CheckLevel::Error);
        assert_eq!(CheckLevel::Warning.to_string(), "WARNING");
    }
}
