pub mod config;
pub mod connection;

use std::fmt;
use std::time::Duration;

use bb8::{ManageConnection, Pool, PooledConnection, RunError};
use tokio::sync::OnceCell;

pub use config::PoolConfig;
pub use connection::DbConnection;

use crate::error::SqlMapperError;
use crate::sqlite::SqliteManager;

/// A `bb8` connection manager whose connections can run mapped statements.
pub trait PoolManager:
    ManageConnection<Connection: DbConnection, Error: fmt::Display>
{
}

impl<T> PoolManager for T
where
    T: ManageConnection,
    T::Connection: DbConnection,
    T::Error: fmt::Display,
{
}

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    pub connections: u32,
    pub idle_connections: u32,
}

struct PoolInner<M: PoolManager> {
    pool: Pool<M>,
    autocommit: bool,
}

/// Explicit pool handle, passed by reference into every data-access call.
///
/// Created empty, then initialised exactly once. Anything that needs a connection before
/// initialisation fails with [`SqlMapperError::PoolUninitialized`].
///
/// ```rust,no_run
/// use sql_mapper::prelude::*;
///
/// # async fn demo() -> Result<(), SqlMapperError> {
/// let pool = ConnectionPool::new();
/// pool.init(&PoolConfig::new("www", "www", "awesome.db")).await?;
/// let rows = pool.select("select 1 as one", &[], None).await?;
/// assert_eq!(rows[0].get("one"), Some(&RowValues::Int(1)));
/// # Ok(()) }
/// ```
pub struct ConnectionPool<M: PoolManager = SqliteManager> {
    inner: OnceCell<PoolInner<M>>,
}

impl<M: PoolManager> Default for ConnectionPool<M> {
    fn default() -> Self {
        Self {
            inner: OnceCell::new(),
        }
    }
}

impl<M: PoolManager> fmt::Debug for ConnectionPool<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("initialized", &self.is_initialized())
            .field("state", &self.state())
            .finish()
    }
}

impl ConnectionPool<SqliteManager> {
    /// Uninitialised SQLite-backed pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialise with the SQLite backend described by `config`.
    ///
    /// # Errors
    /// Returns `SqlMapperError::ConfigError` for an invalid config or a second initialisation,
    /// and `SqlMapperError::ConnectionError` if the eager `min_size` connections cannot be opened.
    pub async fn init(&self, config: &PoolConfig) -> Result<(), SqlMapperError> {
        let manager = SqliteManager::from_config(config)?;
        self.init_with_manager(manager, config).await
    }

    /// Build and initialise a SQLite-backed pool in one step.
    ///
    /// # Errors
    /// Same as [`init`](Self::init).
    pub async fn connect(config: &PoolConfig) -> Result<Self, SqlMapperError> {
        let pool = Self::new();
        pool.init(config).await?;
        Ok(pool)
    }
}

impl<M: PoolManager> ConnectionPool<M> {
    /// Uninitialised pool for any backend.
    #[must_use]
    pub fn uninitialized() -> Self {
        Self::default()
    }

    /// Initialise with an explicit connection manager.
    ///
    /// Opens `min_size` connections up front and caps the pool at `max_size`.
    ///
    /// # Errors
    /// Returns `SqlMapperError::ConfigError` for an invalid config or a second initialisation,
    /// and `SqlMapperError::ConnectionError` if the eager connections cannot be opened.
    pub async fn init_with_manager(
        &self,
        manager: M,
        config: &PoolConfig,
    ) -> Result<(), SqlMapperError> {
        config.validate()?;
        if self.is_initialized() {
            return Err(already_initialized());
        }

        tracing::info!(
            database = %config.database,
            min_size = config.min_size,
            max_size = config.max_size,
            "create database connection pool"
        );
        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.min_size))
            .connection_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .build(manager)
            .await
            .map_err(|e| {
                SqlMapperError::ConnectionError(format!("failed to create connection pool: {e}"))
            })?;

        self.inner
            .set(PoolInner {
                pool,
                autocommit: config.autocommit,
            })
            .map_err(|_| already_initialized())
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized()
    }

    /// Pool-level autocommit default used by record writes.
    ///
    /// # Errors
    /// Returns `SqlMapperError::PoolUninitialized` before initialisation.
    pub fn autocommit(&self) -> Result<bool, SqlMapperError> {
        Ok(self.inner()?.autocommit)
    }

    #[must_use]
    pub fn state(&self) -> Option<PoolState> {
        self.inner.get().map(|inner| {
            let state = inner.pool.state();
            PoolState {
                connections: state.connections,
                idle_connections: state.idle_connections,
            }
        })
    }

    /// Check out a connection, waiting while all `max_size` connections are in use.
    ///
    /// The connection goes back to the pool when the returned guard is dropped, whether the
    /// caller finished, failed, or was cancelled.
    ///
    /// # Errors
    /// Returns `SqlMapperError::PoolUninitialized` before initialisation and
    /// `SqlMapperError::ConnectionError` if no connection could be obtained.
    pub async fn acquire(&self) -> Result<PooledConnection<'_, M>, SqlMapperError> {
        let inner = self.inner()?;
        inner.pool.get().await.map_err(|e| match e {
            RunError::User(err) => {
                SqlMapperError::ConnectionError(format!("connection checkout error: {err}"))
            }
            RunError::TimedOut => SqlMapperError::ConnectionError(
                "timed out waiting for a pooled connection".to_string(),
            ),
        })
    }

    /// Return a connection to the pool.
    ///
    /// Dropping the guard is the usual way to release it; this only makes the hand-back
    /// explicit at the call site.
    pub fn release(&self, conn: PooledConnection<'_, M>) {
        drop(conn);
    }

    fn inner(&self) -> Result<&PoolInner<M>, SqlMapperError> {
        self.inner.get().ok_or(SqlMapperError::PoolUninitialized)
    }
}

fn already_initialized() -> SqlMapperError {
    SqlMapperError::ConfigError("connection pool already initialized".to_string())
}
