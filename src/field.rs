use std::fmt;
use std::sync::Arc;

use crate::error::SqlMapperError;
use crate::types::{ColumnType, RowValues};

/// Default applied when a record attribute is read without having been set.
#[derive(Clone)]
pub enum FieldDefault {
    /// Returned as-is on every read.
    Static(RowValues),
    /// Invoked afresh on every read; results are never cached.
    Factory(Arc<dyn Fn() -> RowValues + Send + Sync>),
}

impl FieldDefault {
    pub fn factory<F>(func: F) -> Self
    where
        F: Fn() -> RowValues + Send + Sync + 'static,
    {
        FieldDefault::Factory(Arc::new(func))
    }

    #[must_use]
    pub fn resolve(&self) -> RowValues {
        match self {
            FieldDefault::Static(value) => value.clone(),
            FieldDefault::Factory(func) => func(),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Factory(_) => f.debug_tuple("Factory").field(&"<fn>").finish(),
        }
    }
}

/// Typed column descriptor.
///
/// Built once per model declaration and never mutated afterwards; the `with_*` helpers consume
/// and return the descriptor while it is being declared.
///
/// ```rust
/// use sql_mapper::prelude::*;
///
/// let id = Field::string().primary_key().with_factory(next_id);
/// let admin = Field::boolean();
/// assert!(id.is_primary_key());
/// assert_eq!(admin.default_value(), RowValues::Bool(false));
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    name: Option<String>,
    column_type: ColumnType,
    is_primary_key: bool,
    default: Option<FieldDefault>,
}

impl Field {
    #[must_use]
    pub fn new(
        name: Option<&str>,
        column_type: ColumnType,
        is_primary_key: bool,
        default: Option<FieldDefault>,
    ) -> Self {
        Self {
            name: name.map(str::to_string),
            column_type,
            is_primary_key,
            default,
        }
    }

    /// Build from a column type given by name (`"bigint"`, `"text"`, ...).
    ///
    /// # Errors
    /// Returns `SqlMapperError::SchemaError` if the type name is not one of the supported types,
    /// or if a boolean or text column is marked as the primary key.
    pub fn parse(
        name: Option<&str>,
        column_type: &str,
        is_primary_key: bool,
        default: Option<FieldDefault>,
    ) -> Result<Self, SqlMapperError> {
        let column_type = column_type.parse::<ColumnType>()?;
        let field = Self::new(name, column_type, is_primary_key, default);
        if is_primary_key && !field.can_be_key() {
            return Err(SqlMapperError::schema(format!(
                "{column_type} columns cannot be primary keys"
            )));
        }
        Ok(field)
    }

    #[must_use]
    pub fn string() -> Self {
        Self::new(None, ColumnType::String, false, None)
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::new(
            None,
            ColumnType::Boolean,
            false,
            Some(FieldDefault::Static(RowValues::Bool(false))),
        )
    }

    #[must_use]
    pub fn integer() -> Self {
        Self::new(
            None,
            ColumnType::Integer,
            false,
            Some(FieldDefault::Static(RowValues::Int(0))),
        )
    }

    #[must_use]
    pub fn float() -> Self {
        Self::new(
            None,
            ColumnType::Float,
            false,
            Some(FieldDefault::Static(RowValues::Float(0.0))),
        )
    }

    #[must_use]
    pub fn text() -> Self {
        Self::new(None, ColumnType::Text, false, None)
    }

    /// Mark as the primary key. Boolean and text columns cannot be keys: the flag is ignored
    /// for them and a warning is logged.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        if self.can_be_key() {
            self.is_primary_key = true;
        } else {
            tracing::warn!(
                column_type = %self.column_type,
                "{} columns cannot be primary keys; flag ignored",
                self.column_type
            );
        }
        self
    }

    /// Whether `primary_key` takes effect for this column type.
    #[must_use]
    pub fn can_be_key(&self) -> bool {
        !matches!(self.column_type, ColumnType::Boolean | ColumnType::Text)
    }

    /// Use `column` instead of the attribute name in generated SQL.
    #[must_use]
    pub fn named(mut self, column: &str) -> Self {
        self.name = Some(column.to_string());
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<RowValues>) -> Self {
        self.default = Some(FieldDefault::Static(value.into()));
        self
    }

    #[must_use]
    pub fn with_factory<F, V>(mut self, func: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<RowValues>,
    {
        self.default = Some(FieldDefault::factory(move || func().into()));
        self
    }

    /// Explicit column name, if one was declared.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }

    #[must_use]
    pub fn default(&self) -> Option<&FieldDefault> {
        self.default.as_ref()
    }

    /// Resolve the default for an unset attribute; `Null` when none was declared.
    #[must_use]
    pub fn default_value(&self) -> RowValues {
        self.default
            .as_ref()
            .map_or(RowValues::Null, FieldDefault::resolve)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Field, {}:{}>",
            self.column_type,
            self.name.as_deref().unwrap_or("-")
        )
    }
}
