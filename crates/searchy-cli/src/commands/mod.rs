//! Built-in management commands.
//!
//! Every command reads an entity model file (TOML or JSON, see
//! [`EntityCatalog::from_file`]) and works on the catalog it describes.

pub mod check;
pub mod joins;
pub mod resolve;

use std::sync::Arc;

use searchy_core::{SearchyResult, Settings};
use searchy_db::join::{handler_by_name, EntityJoinHandler, BUILTIN_HANDLER_NAMES};
use searchy_db::model::EntityCatalog;

pub use check::CheckCommand;
pub use joins::JoinsCommand;
pub use resolve::ResolveCommand;

use crate::command::CommandRegistry;

/// Registers all built-in management commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(CheckCommand));
    registry.register(Box::new(ResolveCommand));
    registry.register(Box::new(JoinsCommand));
}

// ── Shared arguments ─────────────────────────────────────────────────

pub(crate) fn models_arg() -> clap::Arg {
    clap::Arg::new("models")
        .required(true)
        .help("Path to the entity model file (.toml or .json)")
}

pub(crate) fn handler_arg() -> clap::Arg {
    clap::Arg::new("handler")
        .long("handler")
        .short('H')
        .action(clap::ArgAction::Append)
        .value_parser(clap::builder::PossibleValuesParser::new(BUILTIN_HANDLER_NAMES))
        .help("Join handler to register, in order (repeatable)")
}

pub(crate) fn json_arg() -> clap::Arg {
    clap::Arg::new("json")
        .long("json")
        .action(clap::ArgAction::SetTrue)
        .help("Print the result as JSON")
}

pub(crate) fn load_catalog(matches: &clap::ArgMatches) -> SearchyResult<EntityCatalog> {
    let path = matches
        .get_one::<String>("models")
        .map_or("models.toml", String::as_str);
    tracing::debug!(path, "Loading entity models");
    EntityCatalog::from_file(path)
}

/// Builds the ordered handler list: the settings' default handlers first,
/// then the handlers named on the command line.
///
/// # Errors
///
/// Returns [`SearchyError::UnknownHandler`](searchy_core::SearchyError::UnknownHandler)
/// for a name that is not a built-in handler.
pub fn configured_handlers(
    settings: &Settings,
    matches: &clap::ArgMatches,
) -> SearchyResult<Vec<Arc<dyn EntityJoinHandler>>> {
    let from_args = matches
        .get_many::<String>("handler")
        .into_iter()
        .flatten()
        .map(String::as_str);
    settings
        .default_join_handlers
        .iter()
        .map(String::as_str)
        .chain(from_args)
        .map(handler_by_name)
        .collect()
}
