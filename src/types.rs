use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::SqlMapperError;

/// Values stored in a record attribute, bound as statement parameters, or read back from a row.
///
/// ```rust
/// use sql_mapper::prelude::*;
///
/// let params: Vec<RowValues> = vec![1_i64.into(), "alice".into(), true.into()];
/// assert_eq!(params[1].as_text(), Some("alice"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// JSON value, stored as text
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
    /// NULL value
    Null,
}

impl RowValues {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RowValues::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RowValues::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Booleans come back from SQLite as 0/1 integers, so both forms are accepted.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RowValues::Bool(value) => Some(*value),
            RowValues::Int(1) => Some(true),
            RowValues::Int(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            RowValues::Timestamp(value) => Some(*value),
            RowValues::Text(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            RowValues::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<i32> for RowValues {
    fn from(value: i32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

impl From<JsonValue> for RowValues {
    fn from(value: JsonValue) -> Self {
        RowValues::JSON(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// Column types a [`Field`](crate::field::Field) can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    String,
    Boolean,
    Integer,
    Float,
    Text,
}

impl ColumnType {
    /// DDL type name used when the column is created.
    #[must_use]
    pub fn ddl(self) -> &'static str {
        match self {
            ColumnType::String => "varchar(100)",
            ColumnType::Boolean => "boolean",
            ColumnType::Integer => "bigint",
            ColumnType::Float => "real",
            ColumnType::Text => "text",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ddl())
    }
}

impl FromStr for ColumnType {
    type Err = SqlMapperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "varchar" | "varchar(100)" => Ok(ColumnType::String),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            "integer" | "bigint" | "int" => Ok(ColumnType::Integer),
            "float" | "real" | "double" => Ok(ColumnType::Float),
            "text" => Ok(ColumnType::Text),
            other => Err(SqlMapperError::schema(format!(
                "unsupported column type `{other}`"
            ))),
        }
    }
}
