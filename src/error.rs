use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlMapperError {
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Zero or several primary keys, or an identifier that cannot be quoted.
    #[error("Schema error: {reason}")]
    SchemaError { reason: String },

    #[error("Connection pool used before initialization")]
    PoolUninitialized,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Unknown attribute `{attr}` for table `{table}`")]
    UnknownAttribute { table: String, attr: String },
}

impl SqlMapperError {
    pub(crate) fn schema(reason: impl Into<String>) -> Self {
        SqlMapperError::SchemaError {
            reason: reason.into(),
        }
    }
}
