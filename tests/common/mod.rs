#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bb8::ManageConnection;
use sql_mapper::prelude::*;

/// One statement-level call seen by a [`RecordingConnection`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query(String, Vec<RowValues>, Option<usize>),
    Execute(String, Vec<RowValues>),
    Begin,
    Commit,
    Rollback,
}

/// Shared log and knobs for every connection a [`RecordingManager`] hands out.
#[derive(Clone)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
    pub fail_execute: Arc<AtomicBool>,
    pub fail_commit: Arc<AtomicBool>,
    pub affected: Arc<AtomicU64>,
    pub delay: Arc<Mutex<Option<Duration>>>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self {
            calls: Arc::default(),
            fail_execute: Arc::default(),
            fail_commit: Arc::default(),
            affected: Arc::new(AtomicU64::new(1)),
            delay: Arc::default(),
            in_flight: Arc::default(),
            peak: Arc::default(),
        }
    }
}

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Most statements that were executing at the same moment.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub struct RecordingConnection {
    recorder: Recorder,
}

#[async_trait]
impl DbConnection for RecordingConnection {
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    async fn query(
        &mut self,
        sql: &str,
        params: &[RowValues],
        size: Option<usize>,
    ) -> Result<Vec<Row>, SqlMapperError> {
        self.recorder
            .push(Call::Query(sql.to_string(), params.to_vec(), size));
        Ok(Vec::new())
    }

    async fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<u64, SqlMapperError> {
        self.recorder
            .push(Call::Execute(sql.to_string(), params.to_vec()));

        let now = self.recorder.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.recorder.peak.fetch_max(now, Ordering::SeqCst);
        let delay = *self.recorder.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.recorder.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.recorder.fail_execute.load(Ordering::SeqCst) {
            return Err(SqlMapperError::ExecutionError("boom".to_string()));
        }
        Ok(self.recorder.affected.load(Ordering::SeqCst))
    }

    async fn begin(&mut self) -> Result<(), SqlMapperError> {
        self.recorder.push(Call::Begin);
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), SqlMapperError> {
        self.recorder.push(Call::Commit);
        if self.recorder.fail_commit.load(Ordering::SeqCst) {
            return Err(SqlMapperError::ExecutionError("commit failed".to_string()));
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), SqlMapperError> {
        self.recorder.push(Call::Rollback);
        Ok(())
    }
}

pub struct RecordingManager {
    recorder: Recorder,
}

impl RecordingManager {
    pub fn new(recorder: &Recorder) -> Self {
        Self {
            recorder: recorder.clone(),
        }
    }
}

impl ManageConnection for RecordingManager {
    type Connection = RecordingConnection;
    type Error = SqlMapperError;

    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let recorder = self.recorder.clone();
        async move { Ok(RecordingConnection { recorder }) }
    }

    fn is_valid(
        &self,
        _conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        async { Ok(()) }
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

/// Pool over a fresh [`Recorder`].
pub async fn recording_pool(
    config: &PoolConfig,
) -> Result<(ConnectionPool<RecordingManager>, Recorder), SqlMapperError> {
    let recorder = Recorder::default();
    let pool = ConnectionPool::uninitialized();
    pool.init_with_manager(RecordingManager::new(&recorder), config)
        .await?;
    Ok((pool, recorder))
}

pub struct User;

impl Model for User {
    fn table_name() -> Option<&'static str> {
        Some("users")
    }

    fn fields() -> Vec<(&'static str, Field)> {
        vec![
            ("id", Field::string().primary_key().with_factory(next_id)),
            ("name", Field::string()),
            ("email", Field::string()),
            ("admin", Field::boolean()),
            ("score", Field::integer()),
        ]
    }
}

pub const CREATE_USERS: &str = "create table `users` (\
    `id` varchar(50) not null, \
    `name` varchar(100), \
    `email` varchar(100), \
    `admin` boolean, \
    `score` bigint, \
    primary key (`id`))";

/// Pool over a SQLite file in `dir` with the `users` table created.
pub async fn sqlite_pool(
    dir: &tempfile::TempDir,
    config: impl FnOnce(PoolConfig) -> PoolConfig,
) -> Result<ConnectionPool, SqlMapperError> {
    let path = dir.path().join("mapper.db");
    let config = config(PoolConfig::new("www", "www", &path.to_string_lossy()));
    let pool = ConnectionPool::connect(&config).await?;
    pool.execute(CREATE_USERS, &[], true).await?;
    Ok(pool)
}

pub fn user(name: &str, email: &str, admin: bool, score: i64) -> Record<User> {
    Record::<User>::construct([
        ("name", RowValues::from(name)),
        ("email", RowValues::from(email)),
        ("admin", RowValues::from(admin)),
        ("score", RowValues::from(score)),
    ])
    .unwrap()
}
