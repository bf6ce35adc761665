// SQLite backend: the default implementation of the pool and connection seams.
//
// - config: bb8 connection manager built from a `PoolConfig`
// - connection: `DbConnection` over a mutex-guarded `rusqlite::Connection`
// - params: `RowValues` to SQLite value conversion
// - query: row extraction

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::{SharedSqliteConnection, SqliteManager};
pub use connection::SqliteConnection;
