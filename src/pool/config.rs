use serde::Deserialize;

use crate::error::SqlMapperError;

/// Connection pool settings consumed by [`ConnectionPool::init`](super::ConnectionPool::init).
///
/// `user`, `password` and `database` are required; everything else has a default:
/// ```rust
/// use sql_mapper::prelude::*;
///
/// let cfg: PoolConfig = serde_json::from_str(
///     r#"{"user": "www", "password": "www", "database": "awesome.db"}"#,
/// )
/// .unwrap();
/// assert_eq!(cfg.host, "localhost");
/// assert_eq!(cfg.port, 3306);
/// assert_eq!((cfg.min_size, cfg.max_size), (1, 10));
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PoolConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    /// For the SQLite backend this is the database file path or a `file:` URI.
    #[serde(alias = "db")]
    pub database: String,
    #[serde(default = "default_charset")]
    pub charset: String,
    #[serde(default = "default_autocommit")]
    pub autocommit: bool,
    #[serde(default = "default_min_size", alias = "minsize")]
    pub min_size: u32,
    #[serde(default = "default_max_size", alias = "maxsize")]
    pub max_size: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_charset() -> String {
    "utf8".to_string()
}

fn default_autocommit() -> bool {
    true
}

fn default_min_size() -> u32 {
    1
}

fn default_max_size() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

impl PoolConfig {
    #[must_use]
    pub fn new(user: &str, password: &str, database: &str) -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: user.to_string(),
            password: password.to_string(),
            database: database.to_string(),
            charset: default_charset(),
            autocommit: default_autocommit(),
            min_size: default_min_size(),
            max_size: default_max_size(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }

    #[must_use]
    pub fn with_sizes(mut self, min_size: u32, max_size: u32) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    #[must_use]
    pub fn with_autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = autocommit;
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: &str) -> Self {
        self.charset = charset.to_string();
        self
    }

    /// SQLite `PRAGMA encoding` value for the configured charset.
    ///
    /// # Errors
    /// Returns `SqlMapperError::ConfigError` for charsets the backend cannot store.
    pub fn encoding(&self) -> Result<&'static str, SqlMapperError> {
        match self.charset.to_ascii_lowercase().as_str() {
            "utf8" | "utf8mb4" | "utf-8" => Ok("UTF-8"),
            "utf16" | "utf-16" => Ok("UTF-16"),
            other => Err(SqlMapperError::ConfigError(format!(
                "unsupported charset `{other}`"
            ))),
        }
    }

    /// # Errors
    /// Returns `SqlMapperError::ConfigError` if a required field is empty, the sizes are
    /// inconsistent, or the charset is unsupported.
    pub fn validate(&self) -> Result<(), SqlMapperError> {
        if self.database.trim().is_empty() {
            return Err(SqlMapperError::ConfigError(
                "database is required".to_string(),
            ));
        }
        if self.max_size == 0 {
            return Err(SqlMapperError::ConfigError(
                "max_size must be at least 1".to_string(),
            ));
        }
        if self.min_size > self.max_size {
            return Err(SqlMapperError::ConfigError(format!(
                "min_size ({}) exceeds max_size ({})",
                self.min_size, self.max_size
            )));
        }
        self.encoding().map(|_| ())
    }
}
