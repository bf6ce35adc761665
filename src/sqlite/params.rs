use rusqlite::types::Value;

use crate::types::RowValues;

/// Convert a single `RowValues` to a rusqlite `Value`.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::JSON(json) => Value::Text(json.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
        RowValues::Null => Value::Null,
    }
}

/// Owned SQLite parameters, ready to move onto a blocking thread.
pub struct Params(pub Vec<Value>);

impl Params {
    #[must_use]
    pub fn convert(params: &[RowValues]) -> Self {
        Self(params.iter().map(row_value_to_sqlite_value).collect())
    }

    #[must_use]
    pub fn as_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.0.iter().map(|v| v as &dyn rusqlite::ToSql).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn booleans_and_timestamps() {
        assert_eq!(
            row_value_to_sqlite_value(&RowValues::Bool(true)),
            Value::Integer(1)
        );
        let ts = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(8, 30, 0))
            .unwrap();
        assert_eq!(
            row_value_to_sqlite_value(&RowValues::Timestamp(ts)),
            Value::Text("2024-05-01 08:30:00".into())
        );
    }
}
