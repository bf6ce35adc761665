use std::sync::Arc;

use rusqlite::Statement;
use rusqlite::types::Value;

use crate::error::SqlMapperError;
use crate::results::{Columns, Row};
use crate::types::RowValues;

use super::params::Params;

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
/// Returns `SqlMapperError` if the value cannot be read.
pub fn sqlite_extract_value_sync(
    row: &rusqlite::Row,
    idx: usize,
) -> Result<RowValues, SqlMapperError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    })
}

/// Run a prepared statement and collect at most `size` rows (all rows when `None`).
///
/// # Errors
/// Returns `SqlMapperError` if binding, stepping, or value extraction fails.
pub fn build_rows(
    stmt: &mut Statement<'_>,
    params: &Params,
    size: Option<usize>,
) -> Result<Vec<Row>, SqlMapperError> {
    let columns = Columns::new(
        stmt.column_names()
            .iter()
            .map(std::string::ToString::to_string)
            .collect(),
    );
    let col_count = columns.names().len();
    let limit = size.unwrap_or(usize::MAX);

    let mut rows_iter = stmt.query(&params.as_refs()[..])?;
    let mut rows = Vec::new();
    while rows.len() < limit {
        let Some(row) = rows_iter.next()? else {
            break;
        };
        let mut values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            values.push(sqlite_extract_value_sync(row, i)?);
        }
        rows.push(Row::new(Arc::clone(&columns), values));
    }
    Ok(rows)
}
