use crate::error::SqlMapperError;
use crate::pool::{ConnectionPool, PoolManager};
use crate::schema::Model;
use crate::types::RowValues;

use super::Record;

/// Result of a record write.
///
/// Anything other than exactly one affected row is logged as a warning and otherwise left to
/// the caller to judge.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub rows_affected: u64,
}

impl WriteOutcome {
    /// Whether exactly one row was written.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.rows_affected == 1
    }
}

impl<M: Model> Record<M> {
    /// Insert this record, binding non-key attributes in declaration order, then the key.
    ///
    /// Defaults are resolved once and stored on the record, so a generated key can be read
    /// back after saving.
    ///
    /// # Errors
    /// Pool and backend errors are passed through; a row-count mismatch is not an error.
    pub async fn save<Mgr: PoolManager>(
        &mut self,
        pool: &ConnectionPool<Mgr>,
    ) -> Result<WriteOutcome, SqlMapperError> {
        let args = self.write_args(false)?;
        let autocommit = pool.autocommit()?;
        let rows = pool
            .execute(self.schema.insert_sql(), &args, autocommit)
            .await?;
        Ok(self.outcome("insert", rows))
    }

    /// Update this record's row by primary key, binding non-key attributes in declaration
    /// order, then the key.
    ///
    /// # Errors
    /// Pool and backend errors are passed through; a row-count mismatch is not an error.
    pub async fn update<Mgr: PoolManager>(
        &mut self,
        pool: &ConnectionPool<Mgr>,
    ) -> Result<WriteOutcome, SqlMapperError> {
        let args = self.write_args(true)?;
        let autocommit = pool.autocommit()?;
        let rows = pool
            .execute(self.schema.update_sql(), &args, autocommit)
            .await?;
        Ok(self.outcome("update", rows))
    }

    /// Delete this record's row by primary key.
    ///
    /// # Errors
    /// Pool and backend errors are passed through; a row-count mismatch is not an error.
    pub async fn remove<Mgr: PoolManager>(
        &self,
        pool: &ConnectionPool<Mgr>,
    ) -> Result<WriteOutcome, SqlMapperError> {
        let args = [self.primary_key_value()?];
        let autocommit = pool.autocommit()?;
        let rows = pool
            .execute(self.schema.delete_sql(), &args, autocommit)
            .await?;
        Ok(self.outcome("remove", rows))
    }

    fn write_args(&mut self, for_update: bool) -> Result<Vec<RowValues>, SqlMapperError> {
        let schema = std::sync::Arc::clone(&self.schema);
        let mut args = Vec::with_capacity(schema.non_key_attrs().len() + 2);
        for attr in schema.non_key_attrs() {
            args.push(self.materialize(attr)?);
        }
        let pk = self.materialize(schema.primary_key())?;
        // key-only update template is `set pk=? where pk=?`
        if for_update && args.is_empty() {
            args.push(pk.clone());
        }
        args.push(pk);
        Ok(args)
    }

    fn outcome(&self, action: &str, rows_affected: u64) -> WriteOutcome {
        if rows_affected != 1 {
            tracing::warn!(
                table = %self.schema.table_name(),
                rows_affected,
                "failed to {action} record: affected rows: {rows_affected}"
            );
        }
        WriteOutcome { rows_affected }
    }
}
