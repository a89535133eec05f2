//! Sample application settings.
//!
//! Settings come from `sample.toml` when present, otherwise from the
//! programmatic defaults below. Environment overrides apply in both cases.

use std::path::Path;

use searchy_core::settings::Settings;
use searchy_core::settings_loader;

/// Creates the sample application settings.
pub fn sample_settings() -> Settings {
    Settings {
        debug: true,
        default_join_handlers: vec!["fetching-eager".to_string()],
        cache_decisions: true,
        root_alias: "p".to_string(),
        log_level: "info".to_string(),
        ..Settings::default()
    }
}

/// Loads settings from a TOML or JSON file.
///
/// Falls back to [`sample_settings`] if the file is missing or invalid.
pub fn load_settings(path: impl AsRef<Path>) -> Settings {
    let path = path.as_ref();
    let mut settings = if path.exists() {
        match settings_loader::from_file(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to load settings from {}: {e}. Using defaults.", path.display());
                sample_settings()
            }
        }
    } else {
        tracing::info!("Settings file {} not found. Using defaults.", path.display());
        sample_settings()
    };
    settings_loader::apply_env_overrides(&mut settings);
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_settings_defaults() {
        let settings = sample_settings();
        assert!(settings.debug);
        assert_eq!(settings.root_alias, "p");
        assert_eq!(settings.default_join_handlers, vec!["fetching-eager"]);
    }

    #[test]
    fn test_load_settings_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.toml");
        std::fs::write(&path, "root_alias = \"person\"\ncache_decisions = false\n").unwrap();

        let settings = load_settings(&path);
        assert!(!settings.cache_decisions);
        assert!(settings.default_join_handlers.is_empty());
    }

    #[test]
    fn test_load_settings_missing_file() {
        let settings = load_settings("/nonexistent/sample.toml");
        assert_eq!(settings.default_join_handlers, vec!["fetching-eager"]);
    }

    #[test]
    fn test_load_settings_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.toml");
        std::fs::write(&path, "this is not toml = = =").unwrap();

        let settings = load_settings(&path);
        assert!(settings.debug);
    }
}
