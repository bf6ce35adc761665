use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bb8::ManageConnection;
use rusqlite::OpenFlags;
use tokio::sync::Mutex;

use crate::error::SqlMapperError;
use crate::pool::PoolConfig;

use super::connection::{SqliteConnection, run_blocking};

/// A `rusqlite` connection shared with the blocking thread that drives it.
pub type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// bb8 manager opening SQLite connections.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    path: String,
    encoding: &'static str,
}

impl SqliteManager {
    #[must_use]
    pub fn new(path: String) -> Self {
        Self {
            path,
            encoding: "UTF-8",
        }
    }

    /// Build a manager from pool settings. Only `database` and `charset` apply to SQLite.
    ///
    /// # Errors
    /// Returns `SqlMapperError::ConfigError` if the charset is unsupported.
    pub fn from_config(config: &PoolConfig) -> Result<Self, SqlMapperError> {
        tracing::debug!(
            host = %config.host,
            port = config.port,
            user = %config.user,
            "network settings are not used by the sqlite backend"
        );
        Ok(Self {
            path: config.database.clone(),
            encoding: config.encoding()?,
        })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    fn open(path: &str, encoding: &str) -> Result<rusqlite::Connection, SqlMapperError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = rusqlite::Connection::open_with_flags(path, flags)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // only takes effect before the database file has any content
        conn.execute_batch(&format!("PRAGMA encoding = '{encoding}';"))?;
        Ok(conn)
    }
}

impl ManageConnection for SqliteManager {
    type Connection = SqliteConnection;
    type Error = SqlMapperError;

    #[allow(clippy::manual_async_fn)]
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let path = self.path.clone();
        let encoding = self.encoding;
        async move {
            let conn = tokio::task::spawn_blocking(move || Self::open(&path, encoding))
                .await
                .map_err(|e| {
                    SqlMapperError::ConnectionError(format!("sqlite open join error: {e}"))
                })??;
            tracing::debug!("sqlite connection established");
            Ok(SqliteConnection::new(Arc::new(Mutex::new(conn))))
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        let handle = conn.handle();
        async move {
            run_blocking(handle, |guard| {
                guard.execute_batch("SELECT 1")?;
                Ok(())
            })
            .await
        }
    }

    /// A connection handed back mid-transaction, or with a cancelled statement still running on
    /// its blocking thread, is discarded rather than reused.
    fn has_broken(&self, conn: &mut Self::Connection) -> bool {
        !conn.is_reusable()
    }
}
