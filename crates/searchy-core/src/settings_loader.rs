//! Settings loading from configuration files.
//!
//! This module provides functions to load [`Settings`] from TOML files, JSON
//! files, and to apply environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `SEARCHY_DEBUG` | `debug` |
//! | `SEARCHY_LOG_LEVEL` | `log_level` |
//! | `SEARCHY_ROOT_ALIAS` | `root_alias` |
//! | `SEARCHY_CACHE_DECISIONS` | `cache_decisions` |
//! | `SEARCHY_DEFAULT_JOIN_HANDLERS` | `default_join_handlers` (comma-separated) |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use searchy_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("config/searchy.toml").unwrap();
//! let settings = settings_loader::from_toml_file_with_env("config/searchy.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::SearchyError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Any fields not present in the TOML keep their default values.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, SearchyError> {
    // Go through serde_json::Value so partial documents merge over defaults.
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| SearchyError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    let json_value = toml_to_json(toml_value);
    merge_over_defaults(json_value, "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, SearchyError> {
    let content = read_config_file(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, SearchyError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, SearchyError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| SearchyError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, SearchyError> {
    let content = read_config_file(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from a file, picking the format from its extension.
///
/// `.json` files are read as JSON; everything else is read as TOML.
pub fn from_file(path: impl AsRef<Path>) -> Result<Settings, SearchyError> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => from_json_file(path),
        _ => from_toml_file(path),
    }
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// Boolean variables accept "true"/"1"/"yes" as true and anything else as
/// false.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("SEARCHY_DEBUG") {
        settings.debug = parse_bool(&val);
    }

    if let Ok(val) = std::env::var("SEARCHY_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("SEARCHY_ROOT_ALIAS") {
        let alias = val.trim();
        if !alias.is_empty() {
            settings.root_alias = alias.to_string();
        }
    }

    if let Ok(val) = std::env::var("SEARCHY_CACHE_DECISIONS") {
        settings.cache_decisions = parse_bool(&val);
    }

    if let Ok(val) = std::env::var("SEARCHY_DEFAULT_JOIN_HANDLERS") {
        settings.default_join_handlers = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

// ============================================================
// Helpers
// ============================================================

fn parse_bool(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn read_config_file(path: &Path, format: &str) -> Result<String, SearchyError> {
    std::fs::read_to_string(path).map_err(|e| {
        SearchyError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, SearchyError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        SearchyError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        SearchyError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            root_alias = "p"
            default_join_handlers = ["element-collection"]
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.root_alias, "p");
        assert_eq!(settings.default_join_handlers, vec!["element-collection"]);
        // Defaults preserved
        assert!(settings.cache_decisions);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_from_toml_str_extra() {
        let toml = r#"
            [extra]
            owner = "search-team"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.extra["owner"], "search-team");
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.root_alias, "root");
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = from_toml_str("[[invalid toml content");
        assert!(matches!(result, Err(SearchyError::ConfigurationError(_))));
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let result = from_toml_str("cache_decisions = \"sometimes\"");
        assert!(result.is_err());
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{
            "debug": false,
            "log_level": "debug",
            "cache_decisions": false
        }"#;

        let settings = from_json_str(json).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "debug");
        assert!(!settings.cache_decisions);
        assert_eq!(settings.root_alias, "root");
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{invalid json").is_err());
    }

    // ── File loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("searchy.toml");
        std::fs::write(&path, "root_alias = \"person\"\n").unwrap();

        let settings = from_toml_file(&path).unwrap();
        assert_eq!(settings.root_alias, "person");
    }

    #[test]
    fn test_from_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("searchy.json");
        std::fs::write(&json_path, r#"{"root_alias": "j"}"#).unwrap();
        let toml_path = dir.path().join("searchy.toml");
        std::fs::write(&toml_path, "root_alias = \"t\"\n").unwrap();

        assert_eq!(from_file(&json_path).unwrap().root_alias, "j");
        assert_eq!(from_file(&toml_path).unwrap().root_alias, "t");
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = from_toml_file("/nonexistent/path/searchy.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read TOML file"));
    }

    #[test]
    fn test_from_json_file_missing() {
        assert!(from_json_file("/nonexistent/path/searchy.json").is_err());
    }

    // ── Environment variable overrides ──────────────────────────────

    #[test]
    fn test_apply_env_overrides_join_handlers() {
        let mut settings = Settings::default();
        std::env::set_var(
            "SEARCHY_DEFAULT_JOIN_HANDLERS",
            "element-collection, fetching-eager,,",
        );
        apply_env_overrides(&mut settings);
        assert_eq!(
            settings.default_join_handlers,
            vec!["element-collection", "fetching-eager"]
        );
        std::env::remove_var("SEARCHY_DEFAULT_JOIN_HANDLERS");
    }

    #[test]
    fn test_apply_env_overrides_root_alias() {
        let mut settings = Settings::default();
        std::env::set_var("SEARCHY_ROOT_ALIAS", "  v  ");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.root_alias, "v");
        std::env::remove_var("SEARCHY_ROOT_ALIAS");
    }

    #[test]
    fn test_apply_env_overrides_cache_decisions() {
        let mut settings = Settings::default();
        std::env::set_var("SEARCHY_CACHE_DECISIONS", "no");
        apply_env_overrides(&mut settings);
        assert!(!settings.cache_decisions);
        std::env::remove_var("SEARCHY_CACHE_DECISIONS");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(parse_bool("yes"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("maybe"));
    }

    // ── merge_json helper ───────────────────────────────────────────

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"outer": {"a": 1, "b": 2}});
        let over = serde_json::json!({"outer": {"b": 3}});
        let merged = merge_json(base, over);
        assert_eq!(merged["outer"]["a"], 1);
        assert_eq!(merged["outer"]["b"], 3);
    }

    #[test]
    fn test_merge_json_array_override() {
        let base = serde_json::json!({"list": [1, 2, 3]});
        let over = serde_json::json!({"list": [4, 5]});
        let merged = merge_json(base, over);
        // Arrays are replaced, not merged
        assert_eq!(merged["list"], serde_json::json!([4, 5]));
    }

    #[test]
    fn test_toml_to_json() {
        let toml_val: toml::Value = toml::from_str(
            r#"
            name = "test"
            count = 42
            flag = true
            items = [1, 2, 3]
            [nested]
            key = "value"
        "#,
        )
        .unwrap();

        let json = toml_to_json(toml_val);
        assert_eq!(json["name"], "test");
        assert_eq!(json["count"], 42);
        assert_eq!(json["flag"], true);
        assert_eq!(json["items"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["nested"]["key"], "value");
    }
}
