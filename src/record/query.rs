
use crate::error::SqlMapperError;
use crate::paging::Page;
use crate::pool::{ConnectionPool, PoolManager};
use crate::schema::{Model, schema_of};
use crate::types::RowValues;

use super::Record;

/// Row limit for [`Record::find_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// `limit ?`
    Count(u64),
    /// `limit ?, ?` with the offset bound first.
    Range { offset: u64, count: u64 },
}

impl From<u64> for Limit {
    fn from(count: u64) -> Self {
        Limit::Count(count)
    }
}

impl From<(u64, u64)> for Limit {
    fn from((offset, count): (u64, u64)) -> Self {
        Limit::Range { offset, count }
    }
}

impl From<&Page> for Limit {
    fn from(page: &Page) -> Self {
        Limit::Range {
            offset: page.offset,
            count: page.limit,
        }
    }
}

/// Optional clauses appended to a model's `select`, in `where`, `order by`, `limit` order.
///
/// ```rust
/// use sql_mapper::prelude::*;
///
/// let opts = FindOptions::new()
///     .filter("`email`=?", vec!["a@example.com".into()])
///     .order_by("created_at desc")
///     .limit((5_u64, 10_u64));
/// let (sql, args) = opts.to_sql("select `id` from `users`");
/// assert_eq!(
///     sql,
///     "select `id` from `users` where `email`=? order by created_at desc limit ?, ?"
/// );
/// assert_eq!(args.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    filter: Option<String>,
    args: Vec<RowValues>,
    order_by: Option<String>,
    limit: Option<Limit>,
}

impl FindOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Predicate written with `?` placeholders, and the values bound to them.
    #[must_use]
    pub fn filter(mut self, predicate: &str, args: Vec<RowValues>) -> Self {
        self.filter = Some(predicate.to_string());
        self.args = args;
        self
    }

    #[must_use]
    pub fn order_by(mut self, order_by: &str) -> Self {
        self.order_by = Some(order_by.to_string());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Append the clauses to `base` and collect the bound values in placeholder order.
    #[must_use]
    pub fn to_sql(&self, base: &str) -> (String, Vec<RowValues>) {
        let mut sql = base.to_string();
        let mut args = self.args.clone();
        if let Some(filter) = &self.filter {
            sql.push_str(" where ");
            sql.push_str(filter);
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(" order by ");
            sql.push_str(order_by);
        }
        match self.limit {
            Some(Limit::Count(count)) => {
                sql.push_str(" limit ?");
                args.push(bound(count));
            }
            Some(Limit::Range { offset, count }) => {
                sql.push_str(" limit ?, ?");
                args.push(bound(offset));
                args.push(bound(count));
            }
            None => {}
        }
        (sql, args)
    }
}

fn bound(n: u64) -> RowValues {
    RowValues::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

impl<M: Model> Record<M> {
    /// Look a record up by primary key.
    ///
    /// # Errors
    /// Returns `SqlMapperError::SchemaError` if `M` does not compile; pool and backend errors are
    /// passed through.
    pub async fn find<Mgr: PoolManager>(
        pool: &ConnectionPool<Mgr>,
        pk: impl Into<RowValues>,
    ) -> Result<Option<Self>, SqlMapperError> {
        let schema = schema_of::<M>()?;
        let sql = format!(
            "{} where `{}`=?",
            schema.select_sql(),
            schema.column(schema.primary_key())
        );
        let rows = pool.select(&sql, &[pk.into()], Some(1)).await?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| Self::from_row(&schema, row)))
    }

    /// Records matching `options`; an empty `Vec` when nothing matches.
    ///
    /// # Errors
    /// Returns `SqlMapperError::SchemaError` if `M` does not compile; pool and backend errors are
    /// passed through.
    pub async fn find_all<Mgr: PoolManager>(
        pool: &ConnectionPool<Mgr>,
        options: &FindOptions,
    ) -> Result<Vec<Self>, SqlMapperError> {
        let schema = schema_of::<M>()?;
        let (sql, args) = options.to_sql(schema.select_sql());
        let rows = pool.select(&sql, &args, None).await?;
        Ok(rows
            .into_iter()
            .map(|row| Self::from_row(&schema, row))
            .collect())
    }

    /// First column of the first row of `select <expr> from <table> [where <filter>]`, e.g.
    /// `count(id)`. `Null` when the query returns no row.
    ///
    /// # Errors
    /// Returns `SqlMapperError::SchemaError` if `M` does not compile; pool and backend errors are
    /// passed through.
    pub async fn find_number<Mgr: PoolManager>(
        pool: &ConnectionPool<Mgr>,
        select_expr: &str,
        filter: Option<&str>,
        args: &[RowValues],
    ) -> Result<RowValues, SqlMapperError> {
        let schema = schema_of::<M>()?;
        let mut sql = format!("select {select_expr} from `{}`", schema.table_name());
        if let Some(filter) = filter {
            sql.push_str(" where ");
            sql.push_str(filter);
        }
        let rows = pool.select(&sql, args, Some(1)).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get_by_index(0))
            .cloned()
            .unwrap_or(RowValues::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_count_limit() {
        let (sql, args) = FindOptions::new().limit(20_u64).to_sql("select `id` from `t`");
        assert_eq!(sql, "select `id` from `t` limit ?");
        assert_eq!(args, vec![RowValues::Int(20)]);
    }

    #[test]
    fn offset_count_limit_binds_offset_first() {
        let (sql, args) = FindOptions::new().limit((5_u64, 10_u64)).to_sql("select `id` from `t`");
        assert_eq!(sql, "select `id` from `t` limit ?, ?");
        assert_eq!(args, vec![RowValues::Int(5), RowValues::Int(10)]);
    }

    #[test]
    fn page_converts_to_range() {
        let page = Page::new(25, 3, 10);
        assert_eq!(
            Limit::from(&page),
            Limit::Range {
                offset: 20,
                count: 10
            }
        );
    }

    #[test]
    fn no_options_is_the_base_select() {
        let (sql, args) = FindOptions::default().to_sql("select `id` from `t`");
        assert_eq!(sql, "select `id` from `t`");
        assert!(args.is_empty());
    }
}
