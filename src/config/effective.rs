//! Effective settings with provenance
//!
//! Captures the merged settings plus where each contributing layer came
//! from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use preset_engine::RuntimeOverrides;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use crate::logging::LOG_LEVELS;
use crate::source::{self, SourceError, SourceFormat};

/// Browser profile used for cookie extraction by presets that need it.
pub const ENV_BROWSER_PROFILE: &str = "BROWSER_PROFILE";

/// Catalog file overriding the built-in presets.
pub const ENV_CATALOG: &str = "VOD_PRESET_CATALOG";

/// Output root for built-in output templates.
pub const ENV_OUTPUT_ROOT: &str = "VOD_PRESET_OUTPUT_ROOT";

/// Origin of a settings layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Builtin,
    User,
    Env,
    Cli,
}

/// A contributing settings layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSource {
    pub origin: SettingsOrigin,

    /// File path (user layer only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (user layer only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Typed view of the merged settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub output_root: String,

    pub log_level: String,

    #[serde(default)]
    pub browser_profile: Option<String>,

    #[serde(default)]
    pub catalog_path: Option<String>,

    /// Preset used when none is named on the command line
    #[serde(default)]
    pub default_preset: Option<String>,

    /// Standing runtime overrides, applied before any given on the command line
    #[serde(default)]
    pub overrides: BTreeMap<String, Value>,
}

impl Settings {
    /// Standing overrides as text, in key order.
    pub fn runtime_overrides(&self) -> RuntimeOverrides {
        let mut out = RuntimeOverrides::new();
        for (key, value) in &self.overrides {
            let raw = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out.push(key.clone(), raw);
        }
        out
    }
}

/// Settings after merging all layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveSettings {
    pub settings: Settings,

    /// Contributing layers in precedence order
    pub sources: Vec<SettingsSource>,
}

impl EffectiveSettings {
    /// Merge built-in defaults, the user file, environment and CLI layers.
    ///
    /// A user file path that does not exist is skipped.
    pub fn build(
        user_config_path: Option<&Path>,
        env: Option<Value>,
        cli: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![SettingsSource {
            origin: SettingsOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = user_config_path {
            if path.exists() {
                let loaded = source::load(path, SourceFormat::Toml)?;
                debug!(path = %path.display(), "loaded user settings");
                layers.push(loaded.value);
                sources.push(SettingsSource {
                    origin: SettingsOrigin::User,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(loaded.digest),
                });
            }
        }

        for (origin, layer) in [(SettingsOrigin::Env, env), (SettingsOrigin::Cli, cli)] {
            if let Some(layer) = layer {
                layers.push(layer);
                sources.push(SettingsSource {
                    origin,
                    path: None,
                    digest: None,
                });
            }
        }

        let merged = merge_layers(layers);
        let settings: Settings = serde_json::from_value(merged)
            .map_err(|e| ConfigError::ValidationError(format!("invalid settings: {}", e)))?;
        Self::validate(&settings)?;

        Ok(Self { settings, sources })
    }

    fn validate(settings: &Settings) -> Result<(), ConfigError> {
        if settings.output_root.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "output_root must not be empty".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&settings.log_level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }

        if let Some(ref preset) = settings.default_preset {
            if preset.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "default_preset must not be empty".to_string(),
                ));
            }
        }

        for (key, value) in &settings.overrides {
            if value.is_array() || value.is_object() {
                return Err(ConfigError::ValidationError(format!(
                    "overrides.{} must be a scalar",
                    key
                )));
            }
        }

        Ok(())
    }

    /// Default user settings file: `$XDG_CONFIG_HOME/vod-preset/config.toml`,
    /// falling back to `~/.config/vod-preset/config.toml`.
    pub fn default_user_path() -> Option<PathBuf> {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            if !xdg.is_empty() {
                return Some(PathBuf::from(xdg).join("vod-preset/config.toml"));
            }
        }
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config/vod-preset/config.toml"))
    }
}

/// Build the environment layer from a variable lookup. Empty values are ignored.
pub fn env_layer<F>(lookup: F) -> Option<Value>
where
    F: Fn(&str) -> Option<String>,
{
    let mut map = serde_json::Map::new();
    for (var, key) in [
        (ENV_BROWSER_PROFILE, "browser_profile"),
        (ENV_CATALOG, "catalog_path"),
        (ENV_OUTPUT_ROOT, "output_root"),
    ] {
        if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
            map.insert(key.to_string(), Value::String(value));
        }
    }
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Settings file not found: {0}")]
    NotFound(PathBuf),
}

impl From<SourceError> for ConfigError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Io(e) => Self::IoError(e.to_string()),
            SourceError::Parse(msg) => Self::ParseError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_build_with_defaults_only() {
        let effective = EffectiveSettings::build(None, None, None).unwrap();

        assert_eq!(effective.settings.output_root, ".");
        assert_eq!(effective.settings.log_level, "warn");
        assert_eq!(effective.settings.browser_profile, None);
        assert!(effective.settings.overrides.is_empty());
        assert_eq!(effective.sources.len(), 1);
        assert_eq!(effective.sources[0].origin, SettingsOrigin::Builtin);
    }

    #[test]
    fn test_layer_precedence() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "output_root = \"/srv/vods\"").unwrap();
        writeln!(temp, "default_preset = \"twitch\"").unwrap();
        writeln!(temp, "[overrides]").unwrap();
        writeln!(temp, "ratelimit = 1000000").unwrap();

        let env = Some(json!({"output_root": "/mnt/vods", "browser_profile": "abc.default"}));
        let cli = Some(json!({"browser_profile": "xyz.default"}));

        let effective = EffectiveSettings::build(Some(temp.path()), env, cli).unwrap();
        let settings = &effective.settings;

        assert_eq!(settings.output_root, "/mnt/vods");
        assert_eq!(settings.default_preset.as_deref(), Some("twitch"));
        assert_eq!(settings.browser_profile.as_deref(), Some("xyz.default"));
        assert_eq!(settings.overrides["ratelimit"], 1000000);

        let origins: Vec<_> = effective.sources.iter().map(|s| s.origin.clone()).collect();
        assert_eq!(
            origins,
            vec![
                SettingsOrigin::Builtin,
                SettingsOrigin::User,
                SettingsOrigin::Env,
                SettingsOrigin::Cli
            ]
        );
        assert_eq!(effective.sources[1].digest.as_ref().map(|d| d.len()), Some(64));
    }

    #[test]
    fn test_missing_user_file_skipped() {
        let effective =
            EffectiveSettings::build(Some(Path::new("/nonexistent/config.toml")), None, None)
                .unwrap();
        assert_eq!(effective.sources.len(), 1);
    }

    #[test]
    fn test_invalid_log_level() {
        let result = EffectiveSettings::build(None, None, Some(json!({"log_level": "loud"})));
        assert!(result.unwrap_err().to_string().contains("log_level"));
    }

    #[test]
    fn test_empty_default_preset_rejected() {
        let result = EffectiveSettings::build(None, None, Some(json!({"default_preset": " "})));
        assert!(result.unwrap_err().to_string().contains("default_preset"));
    }

    #[test]
    fn test_non_scalar_override_rejected() {
        let result = EffectiveSettings::build(
            None,
            None,
            Some(json!({"overrides": {"postprocessors": ["x"]}})),
        );
        assert!(result.unwrap_err().to_string().contains("overrides.postprocessors"));
    }

    #[test]
    fn test_parse_error() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "output_root = ").unwrap();

        let result = EffectiveSettings::build(Some(temp.path()), None, None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_runtime_overrides_as_text() {
        let effective = EffectiveSettings::build(
            None,
            None,
            Some(json!({"overrides": {"ratelimit": 500, "format": "best", "nopart": true}})),
        )
        .unwrap();

        let overrides: Vec<_> = effective
            .settings
            .runtime_overrides()
            .iter()
            .map(|o| (o.key.clone(), o.raw.clone()))
            .collect();
        assert_eq!(
            overrides,
            vec![
                ("format".to_string(), "best".to_string()),
                ("nopart".to_string(), "true".to_string()),
                ("ratelimit".to_string(), "500".to_string()),
            ]
        );
    }

    #[test]
    fn test_env_layer() {
        let vars = |name: &str| match name {
            ENV_BROWSER_PROFILE => Some("abc.default".to_string()),
            ENV_CATALOG => Some(String::new()),
            _ => None,
        };
        assert_eq!(env_layer(vars), Some(json!({"browser_profile": "abc.default"})));
        assert_eq!(env_layer(|_| None), None);
    }
}
