//! Per-instance attribute storage bound to a compiled schema.
//!
//! Attributes are either set explicitly or unset; an unset attribute reads as its field's
//! default, resolved afresh on every read.

mod dml;
mod query;

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

pub use dml::WriteOutcome;
pub use query::{FindOptions, Limit};

use crate::error::SqlMapperError;
use crate::results::Row;
use crate::schema::{Model, Schema, schema_of};
use crate::types::RowValues;

/// One row of model `M`'s table.
///
/// ```rust
/// use sql_mapper::prelude::*;
///
/// struct User;
///
/// impl Model for User {
///     fn fields() -> Vec<(&'static str, Field)> {
///         vec![
///             ("id", Field::string().primary_key().with_factory(next_id)),
///             ("name", Field::string()),
///             ("admin", Field::boolean()),
///         ]
///     }
/// }
///
/// let user = Record::<User>::construct([("name", "Test")]).unwrap();
/// assert_eq!(user.get("name").unwrap(), RowValues::Text("Test".into()));
/// assert_eq!(user.get("admin").unwrap(), RowValues::Bool(false));
/// assert!(!user.is_set("id"));
/// ```
pub struct Record<M: Model> {
    schema: Arc<Schema>,
    values: HashMap<String, RowValues>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Record<M> {
    /// Empty record; every attribute unset.
    ///
    /// # Errors
    /// Returns `SqlMapperError::SchemaError` if `M`'s declaration does not compile.
    pub fn new() -> Result<Self, SqlMapperError> {
        Ok(Self::with_schema(schema_of::<M>()?))
    }

    /// Record with the given attributes set; the rest stay unset.
    ///
    /// # Errors
    /// Returns `SqlMapperError::SchemaError` if `M` does not compile, and
    /// `SqlMapperError::UnknownAttribute` if a name is not a declared attribute.
    pub fn construct<I, K, V>(values: I) -> Result<Self, SqlMapperError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RowValues>,
    {
        let mut record = Self::new()?;
        for (attr, value) in values {
            record.set(attr.as_ref(), value)?;
        }
        Ok(record)
    }

    fn with_schema(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            values: HashMap::new(),
            _model: PhantomData,
        }
    }

    /// Map a result row onto a record; columns without a matching attribute are ignored.
    pub(crate) fn from_row(schema: &Arc<Schema>, row: Row) -> Self {
        let mut record = Self::with_schema(Arc::clone(schema));
        let columns: Vec<String> = row.column_names().to_vec();
        for (column, value) in columns.into_iter().zip(row.into_values()) {
            if let Some(attr) = schema.attr_for_column(&column) {
                record.values.insert(attr.to_string(), value);
            }
        }
        record
    }

    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The set value, or the field default when unset (`Null` if there is none).
    ///
    /// # Errors
    /// Returns `SqlMapperError::UnknownAttribute` if `attr` is not declared.
    pub fn get(&self, attr: &str) -> Result<RowValues, SqlMapperError> {
        if let Some(value) = self.values.get(attr) {
            return Ok(value.clone());
        }
        self.schema
            .field(attr)
            .map(crate::field::Field::default_value)
            .ok_or_else(|| self.unknown(attr))
    }

    /// # Errors
    /// Returns `SqlMapperError::UnknownAttribute` if `attr` is not declared.
    pub fn set(&mut self, attr: &str, value: impl Into<RowValues>) -> Result<(), SqlMapperError> {
        if self.schema.field(attr).is_none() {
            return Err(self.unknown(attr));
        }
        self.values.insert(attr.to_string(), value.into());
        Ok(())
    }

    /// Builder-style [`set`](Self::set).
    ///
    /// # Errors
    /// Returns `SqlMapperError::UnknownAttribute` if `attr` is not declared.
    pub fn with(mut self, attr: &str, value: impl Into<RowValues>) -> Result<Self, SqlMapperError> {
        self.set(attr, value)?;
        Ok(self)
    }

    /// Clear an attribute back to unset, returning its previous value.
    pub fn unset(&mut self, attr: &str) -> Option<RowValues> {
        self.values.remove(attr)
    }

    #[must_use]
    pub fn is_set(&self, attr: &str) -> bool {
        self.values.contains_key(attr)
    }

    /// Primary key value, with the default applied when unset.
    ///
    /// # Errors
    /// Never fails for a compiled schema; kept fallible like [`get`](Self::get).
    pub fn primary_key_value(&self) -> Result<RowValues, SqlMapperError> {
        self.get(self.schema.primary_key())
    }

    /// Resolve `attr` and store the result, so later reads see exactly what was bound.
    fn materialize(&mut self, attr: &str) -> Result<RowValues, SqlMapperError> {
        let value = self.get(attr)?;
        self.values.insert(attr.to_string(), value.clone());
        Ok(value)
    }

    fn unknown(&self, attr: &str) -> SqlMapperError {
        SqlMapperError::UnknownAttribute {
            table: self.schema.table_name().to_string(),
            attr: attr.to_string(),
        }
    }
}

impl<M: Model> Clone for Record<M> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            values: self.values.clone(),
            _model: PhantomData,
        }
    }
}

impl<M: Model> fmt::Debug for Record<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (attr, _) in self.schema.fields() {
            map.entry(&attr, &self.values.get(attr));
        }
        map.finish()
    }
}

/// Serialises every declared attribute in declaration order, defaults resolved.
impl<M: Model> Serialize for Record<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.schema.fields().count()))?;
        for (attr, field) in self.schema.fields() {
            let value = self
                .values
                .get(attr)
                .cloned()
                .unwrap_or_else(|| field.default_value());
            map.serialize_entry(attr, &value)?;
        }
        map.end()
    }
}
