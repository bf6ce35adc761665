use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SqlMapperError;
use crate::pool::DbConnection;
use crate::results::Row;
use crate::translation::PlaceholderStyle;
use crate::types::RowValues;

use super::config::SharedSqliteConnection;
use super::params::Params;
use super::query::build_rows;

/// Pooled SQLite connection; statements run on tokio's blocking pool.
pub struct SqliteConnection {
    conn: SharedSqliteConnection,
    in_transaction: bool,
}

impl SqliteConnection {
    pub(crate) fn new(conn: SharedSqliteConnection) -> Self {
        Self {
            conn,
            in_transaction: false,
        }
    }

    pub(crate) fn handle(&self) -> SharedSqliteConnection {
        Arc::clone(&self.conn)
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Idle and outside any transaction, as SQLite itself reports it.
    ///
    /// The flag alone is not enough: a cancelled `begin` still runs `BEGIN` on the blocking
    /// thread after its future is gone. A handle still locked by such a task counts as busy.
    #[must_use]
    pub fn is_reusable(&self) -> bool {
        !self.in_transaction
            && self
                .conn
                .try_lock()
                .is_ok_and(|guard| guard.is_autocommit())
    }

    /// Run synchronous work against the raw `rusqlite::Connection`, e.g. DDL or pragmas the
    /// mapping layer does not expose.
    ///
    /// # Errors
    /// Returns whatever `func` returns, or `SqlMapperError::ExecutionError` if the blocking task
    /// could not be joined.
    pub async fn with_connection<F, R>(&self, func: F) -> Result<R, SqlMapperError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlMapperError> + Send + 'static,
        R: Send + 'static,
    {
        run_blocking(self.handle(), func).await
    }

    async fn batch(&self, sql: &'static str) -> Result<(), SqlMapperError> {
        run_blocking(self.handle(), move |guard| {
            guard.execute_batch(sql)?;
            Ok(())
        })
        .await
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("in_transaction", &self.in_transaction)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DbConnection for SqliteConnection {
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Numbered
    }

    async fn query(
        &mut self,
        sql: &str,
        params: &[RowValues],
        size: Option<usize>,
    ) -> Result<Vec<Row>, SqlMapperError> {
        let converted = Params::convert(params);
        let sql_owned = sql.to_owned();
        run_blocking(self.handle(), move |guard| {
            let mut stmt = guard.prepare(&sql_owned)?;
            build_rows(&mut stmt, &converted, size)
        })
        .await
    }

    async fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<u64, SqlMapperError> {
        let converted = Params::convert(params);
        let sql_owned = sql.to_owned();
        run_blocking(self.handle(), move |guard| {
            let mut stmt = guard.prepare(&sql_owned)?;
            let affected = stmt.execute(&converted.as_refs()[..])?;
            Ok(affected as u64)
        })
        .await
    }

    async fn begin(&mut self) -> Result<(), SqlMapperError> {
        self.batch("BEGIN").await?;
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), SqlMapperError> {
        self.batch("COMMIT").await?;
        self.in_transaction = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), SqlMapperError> {
        self.batch("ROLLBACK").await?;
        self.in_transaction = false;
        Ok(())
    }
}

pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, SqlMapperError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlMapperError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| SqlMapperError::ExecutionError(format!("sqlite spawn_blocking join error: {e}")))?
}
