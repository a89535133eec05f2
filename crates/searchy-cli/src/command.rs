//! Management command framework for searchy-rs.
//!
//! This module provides the [`ManagementCommand`] trait for defining CLI
//! commands and [`CommandRegistry`] for registering and dispatching them.
//!
//! ## Defining a Custom Command
//!
//! ```rust
//! use searchy_cli::command::{CommandRegistry, ManagementCommand};
//! use searchy_core::{SearchyResult, Settings};
//!
//! struct AliasCommand;
//!
//! impl ManagementCommand for AliasCommand {
//!     fn name(&self) -> &str { "alias" }
//!     fn help(&self) -> &str { "Print the root alias" }
//!
//!     fn handle(&self, _matches: &clap::ArgMatches, settings: &Settings) -> SearchyResult<()> {
//!         println!("{}", settings.root_alias);
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = CommandRegistry::new();
//! registry.register(Box::new(AliasCommand));
//! let matches = registry.build_cli().try_get_matches_from(["searchy", "alias"]).unwrap();
//! registry.execute(&matches, &Settings::default()).unwrap();
//! ```

use std::collections::HashMap;

use searchy_core::{SearchyError, SearchyResult, Settings};

/// A management command that can be registered and invoked through the CLI.
pub trait ManagementCommand: Send + Sync {
    /// Returns the name of this command (used to invoke it from the CLI).
    fn name(&self) -> &str;

    /// Returns a short help description for this command.
    fn help(&self) -> &str;

    /// Adds custom arguments to the clap command.
    ///
    /// The default implementation returns the command unchanged.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Executes the command with the given argument matches and settings.
    fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> SearchyResult<()>;
}

/// A registry of management commands, keyed by name.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn ManagementCommand>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Creates a new empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Registers a management command.
    ///
    /// If a command with the same name already exists, it is replaced.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        let name = command.name().to_string();
        self.commands.insert(name, command);
    }

    /// Returns the command with the given name, if registered.
    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Returns a sorted list of all registered command names.
    pub fn list_commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds a top-level clap `Command` containing all registered subcommands.
    pub fn build_cli(&self) -> clap::Command {
        let mut app = clap::Command::new("searchy")
            .about("searchy-rs join planning utility")
            .subcommand_required(true)
            .arg_required_else_help(true);

        let mut entries: Vec<_> = self.commands.iter().collect();
        entries.sort_by_key(|(name, _)| (*name).clone());

        for (name, cmd) in entries {
            // clap needs 'static names; commands are registered once at startup.
            let static_name: &'static str = Box::leak(name.clone().into_boxed_str());
            let subcmd = clap::Command::new(static_name).about(cmd.help().to_string());
            app = app.subcommand(cmd.add_arguments(subcmd));
        }

        app
    }

    /// Executes the subcommand selected in `matches`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchyError::ConfigurationError`] if no subcommand or an
    /// unknown one was selected, or the command's own error.
    pub fn execute(&self, matches: &clap::ArgMatches, settings: &Settings) -> SearchyResult<()> {
        let (name, sub_matches) = matches.subcommand().ok_or_else(|| {
            SearchyError::ConfigurationError("No subcommand specified".to_string())
        })?;

        let cmd = self.get(name).ok_or_else(|| {
            SearchyError::ConfigurationError(format!("Unknown command: {name}"))
        })?;

        tracing::debug!(command = name, "Running management command");
        cmd.handle(sub_matches, settings)
    }
}
