//! Layered JSON configuration: a defaults document overridden by an optional second one.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SqlMapperError;
use crate::pool::PoolConfig;

/// Merged application configuration.
///
/// ```rust
/// use serde_json::json;
/// use sql_mapper::prelude::*;
///
/// let cfg = AppConfig::from_layers(
///     json!({"db": {"user": "www", "password": "www", "database": "a.db", "port": 3306}}),
///     Some(json!({"db": {"database": "b.db"}, "unknown": 1})),
/// );
/// assert_eq!(cfg.get("db.database"), Some(&json!("b.db")));
/// assert_eq!(cfg.get("unknown"), None);
/// assert_eq!(cfg.pool_config().unwrap().database, "b.db");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    root: Value,
}

impl AppConfig {
    #[must_use]
    pub fn from_layers(defaults: Value, overrides: Option<Value>) -> Self {
        let root = match overrides {
            Some(overrides) => merge(&defaults, &overrides),
            None => defaults,
        };
        Self { root }
    }

    /// Read the defaults file and, when it exists, the override file.
    ///
    /// # Errors
    /// Returns `SqlMapperError::IoError` if the defaults file cannot be read and
    /// `SqlMapperError::JsonError` if either file is not valid JSON.
    pub fn load(
        defaults_path: impl AsRef<Path>,
        override_path: impl AsRef<Path>,
    ) -> Result<Self, SqlMapperError> {
        let defaults: Value = serde_json::from_str(&std::fs::read_to_string(defaults_path)?)?;
        let override_path = override_path.as_ref();
        let overrides = if override_path.exists() {
            Some(serde_json::from_str(&std::fs::read_to_string(
                override_path,
            )?)?)
        } else {
            tracing::debug!(path = %override_path.display(), "no config override found");
            None
        };
        Ok(Self::from_layers(defaults, overrides))
    }

    /// Value at a dotted path such as `db.host`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.root, |node, key| node.as_object()?.get(key))
    }

    /// Deserialize the section at a dotted path.
    ///
    /// # Errors
    /// Returns `SqlMapperError::ConfigError` if the section is missing and
    /// `SqlMapperError::JsonError` if it does not match `T`.
    pub fn section<T: DeserializeOwned>(&self, path: &str) -> Result<T, SqlMapperError> {
        let value = self
            .get(path)
            .ok_or_else(|| SqlMapperError::ConfigError(format!("missing config section `{path}`")))?;
        Ok(T::deserialize(value)?)
    }

    /// The `db` section as pool settings.
    ///
    /// # Errors
    /// Same as [`section`](Self::section).
    pub fn pool_config(&self) -> Result<PoolConfig, SqlMapperError> {
        self.section("db")
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.root
    }
}

/// Overlay `overrides` onto `defaults`. Only keys already present in `defaults` are taken;
/// nested objects merge recursively.
#[must_use]
pub fn merge(defaults: &Value, overrides: &Value) -> Value {
    let (Some(base), Some(over)) = (defaults.as_object(), overrides.as_object()) else {
        return overrides.clone();
    };
    let merged = base
        .iter()
        .map(|(key, value)| {
            let value = match over.get(key) {
                Some(replacement) if value.is_object() => merge(value, replacement),
                Some(replacement) => replacement.clone(),
                None => value.clone(),
            };
            (key.clone(), value)
        })
        .collect();
    Value::Object(merged)
}
