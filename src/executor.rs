//! Parameterized statement execution over a checked-out pool connection.
//!
//! Each call checks out one connection, runs one statement, and returns the connection when it
//! finishes, on success or failure alike.

use crate::error::SqlMapperError;
use crate::pool::{ConnectionPool, DbConnection, PoolManager};
use crate::results::Row;
use crate::translation::translate_placeholders;
use crate::types::RowValues;

impl<M: PoolManager> ConnectionPool<M> {
    /// Run a row-returning statement written with `?` placeholders.
    ///
    /// Fetches at most `size` rows when given, otherwise every row. No match yields an empty
    /// `Vec`.
    ///
    /// # Errors
    /// Returns `SqlMapperError::PoolUninitialized` before initialisation; backend errors are
    /// passed through unchanged.
    pub async fn select(
        &self,
        sql: &str,
        args: &[RowValues],
        size: Option<usize>,
    ) -> Result<Vec<Row>, SqlMapperError> {
        tracing::info!("SQL: {sql}");
        let mut guard = self.acquire().await?;
        let conn: &mut M::Connection = &mut guard;
        let native = translate_placeholders(sql, conn.placeholder_style());
        let rows = conn.query(&native, args, size).await?;
        tracing::debug!(rows = rows.len(), "rows returned");
        Ok(rows)
    }

    /// Run a write statement written with `?` placeholders and return the affected-row count.
    ///
    /// With `autocommit` off the statement is wrapped in an explicit transaction: committed on
    /// success, rolled back once on any failure, after which the original error is returned.
    ///
    /// # Errors
    /// Returns `SqlMapperError::PoolUninitialized` before initialisation; backend errors are
    /// passed through unchanged.
    pub async fn execute(
        &self,
        sql: &str,
        args: &[RowValues],
        autocommit: bool,
    ) -> Result<u64, SqlMapperError> {
        tracing::info!("SQL: {sql}");
        let mut guard = self.acquire().await?;
        let conn: &mut M::Connection = &mut guard;
        let native = translate_placeholders(sql, conn.placeholder_style());

        if autocommit {
            return conn.execute(&native, args).await;
        }

        conn.begin().await?;
        let outcome = match conn.execute(&native, args).await {
            Ok(affected) => conn.commit().await.map(|()| affected),
            Err(err) => Err(err),
        };
        if outcome.is_err()
            && let Err(rollback_err) = conn.rollback().await
        {
            tracing::error!(error = %rollback_err, "rollback failed");
        }
        outcome
    }
}
