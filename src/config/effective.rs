//! Effective configuration with provenance
//!
//! Captures the merged configuration, the typed settings derived from it,
//! and where each layer came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use super::settings::Settings;

/// Origin of a configuration layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Env,
}

/// A contributing layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/env)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/env)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Merged configuration ready for use
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// Typed settings (contains the token, never serialized)
    #[serde(skip)]
    pub settings: Settings,

    /// Merged configuration with secrets redacted
    pub config: Value,

    /// Contributing layers in precedence order
    pub sources: Vec<ConfigSource>,

    /// Redacted key paths
    pub redactions: Vec<String>,
}

/// Keys that contain secrets and should be redacted
const SECRET_KEYS: &[&str] = &["password", "token", "secret", "api_key", "credential"];

impl EffectiveConfig {
    /// Build the effective config from defaults, an optional file and
    /// optional environment overrides.
    ///
    /// A path that was given but does not exist is an error.
    pub fn build(config_path: Option<&Path>, env_overrides: Option<Value>) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = config_path {
            let (value, digest) = Self::load_toml_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(env) = env_overrides {
            layers.push(env);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Env,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        let settings: Settings = serde_json::from_value(merged.clone())
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        settings.validate()?;

        let mut config = merged;
        let redactions = Self::redact_secrets(&mut config);

        Ok(Self {
            created_at: Utc::now(),
            settings,
            config,
            sources,
            redactions,
        })
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((Self::toml_to_json(toml_value), digest))
    }

    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => Value::Array(arr.into_iter().map(Self::toml_to_json).collect()),
            toml::Value::Table(table) => Value::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect(),
            ),
        }
    }

    fn redact_secrets(value: &mut Value) -> Vec<String> {
        let mut redactions = Vec::new();
        Self::redact_recursive(value, String::new(), &mut redactions);
        redactions
    }

    fn redact_recursive(value: &mut Value, path: String, redactions: &mut Vec<String>) {
        if let Value::Object(map) = value {
            for (key, val) in map.iter_mut() {
                let current_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                let key_lower = key.to_lowercase();
                let is_secret = SECRET_KEYS.iter().any(|s| key_lower.contains(s));

                if is_secret && !val.is_object() && !val.is_array() {
                    *val = Value::String("[REDACTED]".to_string());
                    redactions.push(current_path);
                } else {
                    Self::redact_recursive(val, current_path, redactions);
                }
            }
        }
    }

    /// Serialize to JSON (secrets already redacted)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn credentials() -> Value {
        json!({"server": {"url": "https://foreman.example.com", "token": "s3cret"}})
    }

    #[test]
    fn test_defaults_alone_are_incomplete() {
        let err = EffectiveConfig::build(None, None).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("server.url"));
    }

    #[test]
    fn test_env_layer_completes_defaults() {
        let config = EffectiveConfig::build(None, Some(credentials())).unwrap();

        assert_eq!(config.settings.server.url, "https://foreman.example.com");
        assert_eq!(config.settings.server.token, "s3cret");
        assert_eq!(config.settings.retention.keep, 3);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[1].origin, ConfigOrigin::Env);
    }

    #[test]
    fn test_token_redacted_in_serialized_form() {
        let config = EffectiveConfig::build(None, Some(credentials())).unwrap();

        assert_eq!(config.config["server"]["token"], "[REDACTED]");
        assert!(config.redactions.contains(&"server.token".to_string()));

        let json = config.to_json().unwrap();
        assert!(!json.contains("s3cret"));
    }

    #[test]
    fn test_file_layer_with_env_precedence() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[server]").unwrap();
        writeln!(temp, "url = \"https://file.example.com\"").unwrap();
        writeln!(temp, "token = \"from-file\"").unwrap();
        writeln!(temp, "user = \"admin\"").unwrap();
        writeln!(temp, "[retention]").unwrap();
        writeln!(temp, "keep = 5").unwrap();

        let env = json!({"server": {"url": "https://env.example.com"}});
        let config = EffectiveConfig::build(Some(temp.path()), Some(env)).unwrap();

        assert_eq!(config.settings.server.url, "https://env.example.com");
        assert_eq!(config.settings.server.user, "admin");
        assert_eq!(config.settings.server.token, "from-file");
        assert_eq!(config.settings.retention.keep, 5);
        assert_eq!(config.config["retention"]["keep"], 5);

        let file = &config.sources[1];
        assert_eq!(file.origin, ConfigOrigin::File);
        assert_eq!(file.digest.as_ref().map(String::len), Some(64));
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = EffectiveConfig::build(Some(&missing), Some(credentials())).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[server").unwrap();

        let err = EffectiveConfig::build(Some(temp.path()), Some(credentials())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_wrong_type_is_validation_error() {
        let env = json!({"server": {"url": "https://x", "token": "t"}, "retention": {"keep": "many"}});
        let err = EffectiveConfig::build(None, Some(env)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
