use async_trait::async_trait;

use crate::error::SqlMapperError;
use crate::results::Row;
use crate::translation::PlaceholderStyle;
use crate::types::RowValues;

/// Statement-level surface a pooled backend connection must offer.
///
/// SQL handed to `query` and `execute` has already been translated into the connection's
/// [`placeholder_style`](DbConnection::placeholder_style).
#[async_trait]
pub trait DbConnection: Send {
    fn placeholder_style(&self) -> PlaceholderStyle;

    /// Run a row-returning statement, fetching at most `size` rows when given.
    async fn query(
        &mut self,
        sql: &str,
        params: &[RowValues],
        size: Option<usize>,
    ) -> Result<Vec<Row>, SqlMapperError>;

    /// Run a statement and return the backend-reported affected-row count.
    async fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<u64, SqlMapperError>;

    async fn begin(&mut self) -> Result<(), SqlMapperError>;

    async fn commit(&mut self) -> Result<(), SqlMapperError>;

    async fn rollback(&mut self) -> Result<(), SqlMapperError>;
}
