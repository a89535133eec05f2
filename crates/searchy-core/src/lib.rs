//! # searchy-core
//!
//! Settings, logging, and error types shared by every searchy-rs crate.
//! This crate knows nothing about entities or joins; it is the foundation the
//! other crates build on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Search settings and global configuration
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{SearchyError, SearchyResult};
pub use settings::{Settings, SETTINGS};
