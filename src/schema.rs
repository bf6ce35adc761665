//! Model declarations compiled into immutable schemas with precomputed SQL templates.
//!
//! A schema is compiled once per model type and cached for the life of the process:
//! ```rust
//! use sql_mapper::prelude::*;
//!
//! struct User;
//!
//! impl Model for User {
//!     fn table_name() -> Option<&'static str> {
//!         Some("users")
//!     }
//!
//!     fn fields() -> Vec<(&'static str, Field)> {
//!         vec![
//!             ("id", Field::string().primary_key()),
//!             ("email", Field::string()),
//!             ("admin", Field::boolean()),
//!         ]
//!     }
//! }
//!
//! let schema = schema_of::<User>().unwrap();
//! assert_eq!(schema.select_sql(), "select `id`, `email`, `admin` from `users`");
//! assert_eq!(
//!     schema.insert_sql(),
//!     "insert into `users` (`email`, `admin`, `id`) values (?, ?, ?)"
//! );
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use regex::Regex;

use crate::error::SqlMapperError;
use crate::field::Field;

/// A record type mapped to a single table.
///
/// Exactly one field must be a primary key. `Field::primary_key` has no effect on boolean and
/// text fields, so a model keyed only on one of those fails to compile with a `SchemaError`.
pub trait Model: Send + Sync + 'static {
    /// Table override; defaults to the type's unqualified name.
    fn table_name() -> Option<&'static str> {
        None
    }

    /// Declared attributes in declaration order.
    fn fields() -> Vec<(&'static str, Field)>;
}

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

type SchemaRegistry = LazyLock<RwLock<HashMap<TypeId, Arc<Schema>>>>;

static REGISTRY: SchemaRegistry = LazyLock::new(|| RwLock::new(HashMap::new()));

/// Compiled, immutable mapping between a model type and its table.
#[derive(Debug)]
pub struct Schema {
    table_name: String,
    fields: Vec<(String, Field)>,
    primary_key: String,
    primary_index: usize,
    non_key_attrs: Vec<String>,
    select_sql: String,
    insert_sql: String,
    update_sql: String,
    delete_sql: String,
}

impl Schema {
    /// Compile a declaration into a schema.
    ///
    /// # Errors
    /// Returns `SqlMapperError::SchemaError` if the declaration has zero or more than one primary
    /// key, repeats an attribute, or uses an identifier that cannot be quoted with backticks.
    pub fn compile(
        type_name: &str,
        table_name: Option<&str>,
        declared: Vec<(&str, Field)>,
    ) -> Result<Self, SqlMapperError> {
        let table_name = table_name.unwrap_or(type_name).to_string();
        check_identifier("table", &table_name)?;

        let mut fields: Vec<(String, Field)> = Vec::with_capacity(declared.len());
        let mut primary_key: Option<(String, usize)> = None;
        let mut non_key_attrs = Vec::new();

        for (attr, field) in declared {
            check_identifier("attribute", attr)?;
            if let Some(column) = field.name() {
                check_identifier("column", column)?;
            }
            if fields.iter().any(|(existing, _)| existing == attr) {
                return Err(SqlMapperError::schema(format!(
                    "duplicate attribute `{attr}` in `{table_name}`"
                )));
            }
            tracing::debug!(table = %table_name, attr, field = %field, "found mapping");
            if field.is_primary_key() {
                if let Some((existing, _)) = &primary_key {
                    return Err(SqlMapperError::schema(format!(
                        "duplicate primary key `{attr}` in `{table_name}` (already `{existing}`)"
                    )));
                }
                primary_key = Some((attr.to_string(), fields.len()));
            } else {
                non_key_attrs.push(attr.to_string());
            }
            fields.push((attr.to_string(), field));
        }

        let (primary_key, primary_index) = primary_key.ok_or_else(|| {
            SqlMapperError::schema(format!(
                "primary key not found in `{table_name}` (boolean and text fields cannot be keys)"
            ))
        })?;

        let mut schema = Schema {
            table_name,
            fields,
            primary_key,
            primary_index,
            non_key_attrs,
            select_sql: String::new(),
            insert_sql: String::new(),
            update_sql: String::new(),
            delete_sql: String::new(),
        };
        schema.build_templates();
        tracing::info!(model = type_name, table = %schema.table_name, "compiled schema");
        Ok(schema)
    }

    fn build_templates(&mut self) {
        let table = self.table_name.clone();
        let pk = quote(self.column(&self.primary_key));
        let columns: Vec<String> = self
            .non_key_attrs
            .iter()
            .map(|attr| quote(self.column(attr)))
            .collect();

        let mut selected = vec![pk.clone()];
        selected.extend(columns.iter().cloned());
        self.select_sql = format!("select {} from `{table}`", selected.join(", "));

        let mut inserted = columns.clone();
        inserted.push(pk.clone());
        let placeholders = vec!["?"; inserted.len()].join(", ");
        self.insert_sql = format!(
            "insert into `{table}` ({}) values ({placeholders})",
            inserted.join(", ")
        );

        // A key-only table still needs a set list; the key is assigned to itself.
        let assignments = if columns.is_empty() {
            format!("{pk}=?")
        } else {
            columns
                .iter()
                .map(|col| format!("{col}=?"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        self.update_sql = format!("update `{table}` set {assignments} where {pk}=?");
        self.delete_sql = format!("delete from `{table}` where {pk}=?");
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Attribute name of the primary key.
    #[must_use]
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Non-key attribute names in declaration order; this is the bind order for writes.
    #[must_use]
    pub fn non_key_attrs(&self) -> &[String] {
        &self.non_key_attrs
    }

    /// All declared attributes with their fields, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(attr, field)| (attr.as_str(), field))
    }

    #[must_use]
    pub fn field(&self, attr: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(name, _)| name == attr)
            .map(|(_, field)| field)
    }

    #[must_use]
    pub fn primary_key_field(&self) -> &Field {
        &self.fields[self.primary_index].1
    }

    /// Column name for an attribute: the field's explicit name, else the attribute itself.
    #[must_use]
    pub fn column<'a>(&'a self, attr: &'a str) -> &'a str {
        self.field(attr).and_then(Field::name).unwrap_or(attr)
    }

    /// Reverse of [`column`](Self::column).
    #[must_use]
    pub fn attr_for_column(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(attr, field)| field.name().unwrap_or(attr.as_str()) == column)
            .map(|(attr, _)| attr.as_str())
    }

    #[must_use]
    pub fn select_sql(&self) -> &str {
        &self.select_sql
    }

    #[must_use]
    pub fn insert_sql(&self) -> &str {
        &self.insert_sql
    }

    #[must_use]
    pub fn update_sql(&self) -> &str {
        &self.update_sql
    }

    #[must_use]
    pub fn delete_sql(&self) -> &str {
        &self.delete_sql
    }
}

/// Compiled schema for `M`, compiling and caching it on first use.
///
/// Repeated calls return the same `Arc`; a failed compilation is not cached and fails again on
/// the next call.
///
/// # Errors
/// Returns `SqlMapperError::SchemaError` if `M`'s declaration does not compile.
pub fn schema_of<M: Model>() -> Result<Arc<Schema>, SqlMapperError> {
    let key = TypeId::of::<M>();
    {
        let registry = REGISTRY.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(schema) = registry.get(&key) {
            return Ok(Arc::clone(schema));
        }
    }

    let mut registry = REGISTRY
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Some(schema) = registry.get(&key) {
        return Ok(Arc::clone(schema));
    }
    let schema = Arc::new(Schema::compile(
        short_type_name::<M>(),
        M::table_name(),
        M::fields(),
    )?);
    registry.insert(key, Arc::clone(&schema));
    Ok(schema)
}

/// Register `M` at startup so declaration errors surface before the first query.
///
/// # Errors
/// Returns `SqlMapperError::SchemaError` if `M`'s declaration does not compile.
pub fn register<M: Model>() -> Result<Arc<Schema>, SqlMapperError> {
    schema_of::<M>()
}

fn short_type_name<M: 'static>() -> &'static str {
    let full = std::any::type_name::<M>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn check_identifier(kind: &str, name: &str) -> Result<(), SqlMapperError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(SqlMapperError::schema(format!("invalid {kind} name `{name}`")))
    }
}

fn quote(identifier: &str) -> String {
    format!("`{identifier}`")
}
