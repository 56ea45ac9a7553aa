//! TOML-based application configuration.
//!
//! Stores the values the rotation engine is evaluated with:
//! - Minimum rest period between uses of the same site
//! - The user's local calendar (UTC offset, first day of the week)
//! - Which revision of the built-in site set is in use
//!
//! Configuration is stored at `~/.config/pumpsite/config.toml`. The engine
//! never reads this file itself; callers load it and pass the validated
//! [`RotationRules`] into every call.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::calendar::LocalCalendar;
use crate::error::{ConfigError, CoreError};
use crate::rotation::RotationRules;
use crate::site::CatalogRevision;

/// Rest-period configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    #[serde(default = "default_minimum_rest_days")]
    pub minimum_rest_days: u32,
}

/// Local calendar configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Minutes east of UTC
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_week_start")]
    pub week_start: Weekday,
}

/// Built-in site set configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub revision: CatalogRevision,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pumpsite/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Revision 2 default. Revision 1 installs defaulted to 3 days.
fn default_minimum_rest_days() -> u32 {
    18
}
fn default_week_start() -> Weekday {
    Weekday::Mon
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            minimum_rest_days: default_minimum_rest_days(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            week_start: default_week_start(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<i64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, or defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, or defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadFailed` if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into())
            }
        };

        toml::from_str(&content).map_err(|e| {
            ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::SaveFailed` on serialization or write failure.
    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// The updated config must still produce valid [`RotationRules`];
    /// otherwise `self` is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let value = match key {
            "catalog.revision" => CatalogRevision::from_key(value)
                .map(CatalogRevision::key)
                .unwrap_or(value),
            _ => value,
        };
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.rules()?;
        *self = updated;
        Ok(())
    }

    pub fn local_calendar(&self) -> Result<LocalCalendar, ConfigError> {
        LocalCalendar::new(self.calendar.utc_offset_minutes, self.calendar.week_start)
    }

    /// Validate into the rules the engine is evaluated with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a zero rest period or an out-of-range offset.
    pub fn rules(&self) -> Result<RotationRules, ConfigError> {
        RotationRules::new(self.rotation.minimum_rest_days, self.local_calendar()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.rotation.minimum_rest_days, 18);
        assert_eq!(parsed.catalog.revision, CatalogRevision::V2);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[rotation]\nminimum_rest_days = 3\n").unwrap();
        assert_eq!(parsed.rotation.minimum_rest_days, 3);
        assert_eq!(parsed.calendar.week_start, Weekday::Mon);
        assert_eq!(parsed.calendar.utc_offset_minutes, 0);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("rotation.minimum_rest_days").as_deref(), Some("18"));
        assert_eq!(cfg.get("calendar.week_start").as_deref(), Some("Mon"));
        assert_eq!(cfg.get("catalog.revision").as_deref(), Some("v2"));
        assert!(cfg.get("rotation.missing_key").is_none());
        assert!(cfg.get("rotation").is_none());
    }

    #[test]
    fn set_updates_number_and_string_values() {
        let mut cfg = Config::default();
        cfg.set("rotation.minimum_rest_days", "3").unwrap();
        cfg.set("calendar.utc_offset_minutes", "-300").unwrap();
        cfg.set("calendar.week_start", "Sun").unwrap();
        cfg.set("catalog.revision", "v1").unwrap();

        assert_eq!(cfg.rotation.minimum_rest_days, 3);
        assert_eq!(cfg.calendar.utc_offset_minutes, -300);
        assert_eq!(cfg.calendar.week_start, Weekday::Sun);
        assert_eq!(cfg.catalog.revision, CatalogRevision::V1);
    }

    #[test]
    fn set_accepts_numeric_revision_alias() {
        let mut cfg = Config::default();
        cfg.set("catalog.revision", "1").unwrap();
        assert_eq!(cfg.catalog.revision, CatalogRevision::V1);
        assert_eq!(cfg.get("catalog.revision").as_deref(), Some("v1"));

        cfg.set("catalog.revision", "2").unwrap();
        assert_eq!(cfg.catalog.revision, CatalogRevision::V2);
        assert!(cfg.set("catalog.revision", "3").is_err());
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert_eq!(
            cfg.set("rotation.nonexistent_key", "1"),
            Err(ConfigError::UnknownKey("rotation.nonexistent_key".into()))
        );
        assert!(cfg.set("rotation", "1").is_err());
    }

    #[test]
    fn set_rejects_zero_rest_days_and_keeps_old_value() {
        let mut cfg = Config::default();
        assert_eq!(
            cfg.set("rotation.minimum_rest_days", "0"),
            Err(ConfigError::InvalidRestDays(0))
        );
        assert_eq!(cfg.rotation.minimum_rest_days, 18);
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("rotation.minimum_rest_days", "soon").is_err());
        assert!(cfg.set("calendar.week_start", "Someday").is_err());
    }

    #[test]
    fn load_missing_file_gives_defaults_and_save_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let mut cfg = Config::default();
        cfg.set("rotation.minimum_rest_days", "7").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.rotation.minimum_rest_days, 7);
    }

    #[test]
    fn load_reports_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "rotation = 12").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(CoreError::InvalidConfiguration(ConfigError::LoadFailed { .. }))
        ));
    }
}
