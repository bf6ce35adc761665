//! Convenient imports for common functionality.

pub use crate::config::AppConfig;
pub use crate::error::SqlMapperError;
pub use crate::field::{Field, FieldDefault};
pub use crate::ids::next_id;
pub use crate::paging::Page;
pub use crate::pool::{ConnectionPool, DbConnection, PoolConfig, PoolManager, PoolState};
pub use crate::record::{FindOptions, Limit, Record, WriteOutcome};
pub use crate::results::Row;
pub use crate::schema::{Model, Schema, register, schema_of};
pub use crate::sqlite::{SqliteConnection, SqliteManager};
pub use crate::translation::{PlaceholderStyle, translate_placeholders};
pub use crate::types::{ColumnType, RowValues};
