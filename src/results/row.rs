use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// Column names shared by every row of one result, with a name-to-index lookup.
#[derive(Debug)]
pub struct Columns {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Columns {
    #[must_use]
    pub fn new(names: Vec<String>) -> Arc<Self> {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            // first occurrence wins for duplicated names
            index.entry(name.clone()).or_insert(i);
        }
        Arc::new(Self { names, index })
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

/// One result row: an ordered mapping of column name to value.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<Columns>,
    values: Vec<RowValues>,
}

impl Row {
    #[must_use]
    pub fn new(columns: Arc<Columns>, values: Vec<RowValues>) -> Self {
        Self { columns, values }
    }

    /// Value of the named column, or `None` if the result had no such column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&RowValues> {
        self.columns
            .position(column)
            .and_then(|idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        self.columns.names()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Columns and values in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.columns
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    #[must_use]
    pub fn into_values(self) -> Vec<RowValues> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_and_index() {
        let cols = Columns::new(vec!["id".into(), "name".into()]);
        let row = Row::new(cols, vec![RowValues::Int(7), "bob".into()]);
        assert_eq!(row.get("name"), Some(&RowValues::Text("bob".into())));
        assert_eq!(row.get_by_index(0), Some(&RowValues::Int(7)));
        assert_eq!(row.get("missing"), None);
        let order: Vec<&str> = row.iter().map(|(c, _)| c).collect();
        assert_eq!(order, ["id", "name"]);
    }

    #[test]
    fn duplicate_column_names_resolve_to_first() {
        let cols = Columns::new(vec!["a".into(), "a".into()]);
        let row = Row::new(cols, vec![RowValues::Int(1), RowValues::Int(2)]);
        assert_eq!(row.get("a"), Some(&RowValues::Int(1)));
    }
}
