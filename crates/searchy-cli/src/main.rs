//! The `searchy` command-line entry point.
//!
//! Settings are read from the file named by `SEARCHY_SETTINGS` (TOML or
//! JSON) with environment overrides applied on top, or from the environment
//! alone when the variable is unset.

use anyhow::Context;
use searchy_cli::command::CommandRegistry;
use searchy_cli::commands::register_builtin_commands;
use searchy_core::logging::setup_logging;
use searchy_core::{settings_loader, Settings, SETTINGS};

fn load_settings() -> anyhow::Result<Settings> {
    match std::env::var("SEARCHY_SETTINGS") {
        Ok(path) => {
            let mut settings = settings_loader::from_file(&path)
                .with_context(|| format!("loading settings from '{path}'"))?;
            settings_loader::apply_env_overrides(&mut settings);
            Ok(settings)
        }
        Err(_) => Ok(settings_loader::from_env()),
    }
}

fn main() -> anyhow::Result<()> {
    SETTINGS.configure(load_settings()?);
    let settings = SETTINGS.get();
    setup_logging(settings);

    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);

    let matches = registry.build_cli().get_matches();
    registry.execute(&matches, settings)?;
    Ok(())
}
