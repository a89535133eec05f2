//! Settings for searchy-rs.
//!
//! This module provides the [`Settings`] struct, which holds the search
//! configuration, and [`LazySettings`], a globally-accessible,
//! lazily-initialized settings instance.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// The complete set of search settings.
///
/// # Examples
///
/// ```
/// use searchy_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.root_alias, "root");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,

    // ── Joins ────────────────────────────────────────────────────────

    /// Join handler names registered ahead of every descriptor's own
    /// handlers (e.g. `"element-collection"`, `"fetching-eager"`).
    pub default_join_handlers: Vec<String>,
    /// Whether the join manager memoizes per-field join decisions by
    /// `(entity type, field name)` for each search descriptor.
    pub cache_decisions: bool,
    /// The alias given to the root entity when rendering join clauses.
    pub root_alias: String,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Core
            debug: true,

            // Joins
            default_join_handlers: Vec::new(),
            cache_decisions: true,
            root_alias: "root".to_string(),

            // Logging
            log_level: "info".to_string(),

            // Extra
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup to set the
/// settings, then use [`get`](LazySettings::get) to access them.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns the configured settings, or `None` before configuration.
    pub fn try_get(&self) -> Option<&Settings> {
        self.inner.get()
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();
