//! Async record-to-row mapping on top of a pooled SQL backend.
//!
//! Declare a record type once with [`Model`](schema::Model), and the crate compiles its
//! table metadata and SQL templates, then loads and persists [`Record`](record::Record)s
//! through an explicit [`ConnectionPool`](pool::ConnectionPool).
//!
//! ```rust,no_run
//! use sql_mapper::prelude::*;
//!
//! struct User;
//!
//! impl Model for User {
//!     fn table_name() -> Option<&'static str> {
//!         Some("users")
//!     }
//!
//!     fn fields() -> Vec<(&'static str, Field)> {
//!         vec![
//!             ("id", Field::string().primary_key().with_factory(next_id)),
//!             ("name", Field::string()),
//!             ("admin", Field::boolean()),
//!         ]
//!     }
//! }
//!
//! # async fn demo() -> Result<(), SqlMapperError> {
//! let pool = ConnectionPool::connect(&PoolConfig::new("www", "www", "awesome.db")).await?;
//! let mut user = Record::<User>::construct([("name", "ada")])?;
//! let outcome = user.save(&pool).await?;
//! assert!(outcome.is_exact());
//!
//! let loaded = Record::<User>::find(&pool, user.get("id")?).await?;
//! assert!(loaded.is_some());
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod field;
pub mod ids;
pub mod paging;
pub mod pool;
pub mod prelude;
pub mod record;
pub mod results;
pub mod schema;
pub mod sqlite;
pub mod translation;
pub mod types;

pub use error::SqlMapperError;
pub use ids::next_id;
