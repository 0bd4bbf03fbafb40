//! Configuration
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. TOML file (`--config`, or `snapvault.toml` in the data directory)
//! 3. CLI overrides
//!
//! Layers are merged as JSON values, then deserialized and validated.

mod defaults;
mod merge;

pub use defaults::BuiltinDefaults;
pub use merge::{deep_merge, merge_layers};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::lifecycle::RetentionPolicy;

/// Name of the config file looked up in the data directory.
pub const DEFAULT_CONFIG_FILE: &str = "snapvault.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Resolved vault configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    pub data_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub settings_path: PathBuf,
    pub records_path: PathBuf,
    pub index_key: String,
    pub managed_kind: String,
    pub type_attribute: String,
    pub retention_days: u32,
    pub lock_timeout_ms: u64,
    pub log_level: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        let d = BuiltinDefaults::default();
        Self {
            data_dir: d.data_dir.into(),
            archive_dir: d.archive_dir.into(),
            settings_path: d.settings_path.into(),
            records_path: d.records_path.into(),
            index_key: d.index_key,
            managed_kind: d.managed_kind,
            type_attribute: d.type_attribute,
            retention_days: d.retention_days,
            lock_timeout_ms: d.lock_timeout_ms,
            log_level: d.log_level,
        }
    }
}

impl VaultConfig {
    /// Build the configuration from all layers.
    ///
    /// An explicit `config_path` must exist. Without one, `snapvault.toml`
    /// in the data directory is used when present.
    pub fn load(config_path: Option<&Path>, overrides: Value) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];

        let file = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let base = merge_layers(vec![layers[0].clone(), overrides.clone()]);
                let data_dir = base
                    .get("data_dir")
                    .and_then(Value::as_str)
                    .map(PathBuf::from)
                    .unwrap_or_default();
                let candidate = data_dir.join(DEFAULT_CONFIG_FILE);
                candidate.is_file().then_some(candidate)
            }
        };

        if let Some(path) = file {
            layers.push(load_toml_file(&path)?);
        }
        layers.push(overrides);

        Self::from_value(merge_layers(layers))
    }

    /// Deserialize a merged value and validate it.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retention_days == 0 {
            return Err(ConfigError::Validation(
                "retention_days must be at least 1".to_string(),
            ));
        }
        if self.lock_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "lock_timeout_ms must be greater than 0".to_string(),
            ));
        }
        for (key, value) in [
            ("index_key", &self.index_key),
            ("managed_kind", &self.managed_kind),
            ("type_attribute", &self.type_attribute),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{} must not be empty", key)));
            }
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    pub fn archive_path(&self) -> PathBuf {
        self.resolve(&self.archive_dir)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.resolve(&self.settings_path)
    }

    pub fn records_file(&self) -> PathBuf {
        self.resolve(&self.records_path)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy::keep_days(self.retention_days)
    }
}

fn load_toml_file(path: &Path) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: toml::Value = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(toml_to_json(parsed))
}

/// Convert a TOML value into the JSON model used for merging.
pub fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
