//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`SyncSettings::default()`]
//! 2. If `~/.kkutu/settings.json` exists, deep-merge it over the defaults
//! 3. Apply `KKUTU_*` environment overrides
//! 4. Validate
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::SyncSettings;

/// Resolve the path to the settings file (`~/.kkutu/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".kkutu").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<SyncSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or an out-of-range value is
/// an error.
pub fn load_settings_from_path(path: &Path) -> Result<SyncSettings> {
    let mut settings = read_merged(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

fn read_merged(path: &Path) -> Result<SyncSettings> {
    let defaults = serde_json::to_value(SyncSettings::default())?;
    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };
    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `KKUTU_*` environment overrides.
pub fn apply_env_overrides(settings: &mut SyncSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// Integers must parse and fall within range; booleans accept
/// `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`. Anything else is
/// ignored with a warning.
pub fn apply_overrides(settings: &mut SyncSettings, lookup: impl Fn(&str) -> Option<String>) {
    let env = EnvReader { lookup };

    // ── Polling ─────────────────────────────────────────────────────
    if let Some(v) = env.u64("KKUTU_PRIMARY_INTERVAL_MS", 1, 60_000) {
        settings.polling.primary_interval_ms = v;
    }
    if let Some(v) = env.u64("KKUTU_INTENSE_INTERVAL_MS", 1, 60_000) {
        settings.polling.intense_interval_ms = v;
    }
    if let Some(v) = env.u64("KKUTU_IDLE_INTERVAL_MS", 1, 600_000) {
        settings.polling.idle_interval_ms = v;
    }
    if let Some(v) = env.u64("KKUTU_SLOW_INTERVAL_MS", 1, 600_000) {
        settings.polling.slow_interval_ms = v;
    }

    // ── Dispatch / logging ──────────────────────────────────────────
    if let Some(v) = env.bool("KKUTU_DISPATCH_ENABLED") {
        settings.dispatch.enabled = v;
    }
    if let Some(v) = env.string("KKUTU_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within `[min, max]`.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

struct EnvReader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = (self.lookup)(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = (self.lookup)(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, min, max, "invalid integer env var, ignoring");
        }
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"polling": {"primaryIntervalMs": 100, "idleIntervalMs": 3000}});
        let source = serde_json::json!({"polling": {"primaryIntervalMs": 50}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["polling"]["primaryIntervalMs"], 50);
        assert_eq!(merged["polling"]["idleIntervalMs"], 3000);
    }

    #[test]
    fn merge_null_preserves_target() {
        let merged = deep_merge(serde_json::json!({"a": 1}), serde_json::json!({"a": null}));
        assert_eq!(merged["a"], 1);
    }

    #[test]
    fn merge_array_replaces() {
        let merged = deep_merge(
            serde_json::json!({"items": [1, 2, 3]}),
            serde_json::json!({"items": [4]}),
        );
        assert_eq!(merged["items"], serde_json::json!([4]));
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn missing_file_returns_defaults() {
        let settings = read_merged(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings, SyncSettings::default());
    }

    #[test]
    fn partial_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"polling": {"intenseIntervalMs": 25}, "dispatch": {"enabled": false}}"#,
        )
        .unwrap();

        let settings = read_merged(&path).unwrap();
        assert_eq!(settings.polling.intense_interval_ms, 25);
        assert_eq!(settings.polling.primary_interval_ms, 100);
        assert!(!settings.dispatch.enabled);
    }

    #[test]
    fn invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            load_settings_from_path(&path).unwrap_err(),
            SettingsError::Json(_)
        ));
    }

    #[test]
    fn zero_interval_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"polling": {"slowIntervalMs": 0}}"#).unwrap();
        assert!(matches!(
            load_settings_from_path(&path).unwrap_err(),
            SettingsError::InvalidValue(_)
        ));
    }

    // ── overrides ───────────────────────────────────────────────────

    #[test]
    fn overrides_apply() {
        let mut settings = SyncSettings::default();
        apply_overrides(
            &mut settings,
            env(&[
                ("KKUTU_PRIMARY_INTERVAL_MS", "250"),
                ("KKUTU_IDLE_INTERVAL_MS", "1000"),
                ("KKUTU_DISPATCH_ENABLED", "off"),
                ("KKUTU_LOG_LEVEL", "debug"),
            ]),
        );
        assert_eq!(settings.polling.primary_interval_ms, 250);
        assert_eq!(settings.polling.idle_interval_ms, 1000);
        assert!(!settings.dispatch.enabled);
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let mut settings = SyncSettings::default();
        apply_overrides(
            &mut settings,
            env(&[
                ("KKUTU_PRIMARY_INTERVAL_MS", "0"),
                ("KKUTU_INTENSE_INTERVAL_MS", "fast"),
                ("KKUTU_DISPATCH_ENABLED", "maybe"),
                ("KKUTU_LOG_LEVEL", ""),
            ]),
        );
        assert_eq!(settings, SyncSettings::default());
    }

    #[test]
    fn parse_helpers() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("nah"), None);
        assert_eq!(parse_u64_range("10", 1, 10), Some(10));
        assert_eq!(parse_u64_range("11", 1, 10), None);
        assert_eq!(parse_u64_range("-1", 1, 10), None);
    }
}
