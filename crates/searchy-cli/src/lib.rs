//! # searchy-cli
//!
//! Management commands for inspecting entity models and the joins a search
//! over them would need.
//!
//! This crate provides:
//!
//! - **Management commands** - A framework for defining and registering CLI commands
//! - **Built-in commands** - `check` validates a model file, `resolve` prints the
//!   join decision for one field, `joins` prints every join of a root entity
//!
//! ## Quick Start
//!
//! ```rust
//! use searchy_cli::command::CommandRegistry;
//! use searchy_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//!
//! let names = registry.list_commands();
//! assert!(names.contains(&"check"));
//! assert!(names.contains(&"joins"));
//! assert!(names.contains(&"resolve"));
//! ```

// These clippy lints are intentionally allowed:
// - result_large_err: SearchyError is the crate-wide error type
// - doc_markdown: backtick requirements for documentation items are too strict
// - missing_const_for_fn: some functions may gain runtime logic later
// - module_name_repetitions: re-exports make module-prefixed names redundant
// - needless_pass_by_value: handler lists are moved into chains
#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]

pub mod command;
pub mod commands;

// Re-export primary types at the crate root for convenience.
pub use command::{CommandRegistry, ManagementCommand};
pub use commands::check::{run_checks, CheckLevel, CheckMessage};
pub use commands::joins::{compute_joins, JoinsReport};
pub use commands::resolve::{resolve_field, ResolveReport};
pub use commands::{
    configured_handlers, register_builtin_commands, CheckCommand, JoinsCommand, ResolveCommand,
};
