//! # Database Handle
//!
//! Opens the library database and hands out repositories.
//!
//! ```text
//! DbConfig::new(path)            admin CLI, seed binary, file-backed tests
//! DbConfig::in_memory()          unit tests
//!       │
//!       ▼
//! Database::new(config)  ──►  SqlitePool (WAL, foreign keys, busy timeout)
//!       │                      + pending migrations applied
//!       ▼
//! db.circulations().issue(..)    each call borrows one pooled connection;
//!                                issue/return keep it for the whole tx
//! ```
//!
//! Concurrent writers on a file database queue behind SQLite's write lock
//! for up to `busy_timeout`. A writer whose snapshot went stale fails with
//! a busy error instead of waiting.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::author::AuthorRepository;
use crate::repository::book::BookRepository;
use crate::repository::circulation::CirculationRepository;
use crate::repository::member::MemberRepository;
use crate::repository::notification::NotificationRepository;
use crate::repository::penalty::PenaltyRepository;
use crate::repository::publisher::PublisherRepository;
use crate::repository::report::ReportRepository;
use crate::repository::settings::SettingsRepository;

const MEMORY_PATH: &str = ":memory:";

/// Where the database lives and how many connections may touch it.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,
    /// Default 5.
    pub max_connections: u32,
    /// How long a writer waits for the SQLite lock. Default 5 seconds.
    pub busy_timeout: Duration,
}

impl DbConfig {
    /// File database at `path`, created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Private in-memory database.
    ///
    /// Every SQLite connection to `:memory:` opens its own empty database, so
    /// the pool is pinned to a single connection.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            ..DbConfig::new(MEMORY_PATH)
        }
    }

    fn is_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }
}

/// Open library database.
///
/// Repositories are thin handles over a clone of the pool; build them per
/// call rather than storing them.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and applies pending migrations.
    ///
    /// ## Errors
    /// * `ConnectionFailed` - bad path or the file cannot be opened
    /// * `MigrationFailed` - the embedded schema could not be applied
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(if config.is_memory() {
                SqliteJournalMode::Memory
            } else {
                SqliteJournalMode::Wal
            })
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;

        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            "Library database open"
        );
        Ok(Database { pool })
    }

    /// Raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.pool.clone())
    }

    pub fn notifications(&self) -> NotificationRepository {
        NotificationRepository::new(self.pool.clone())
    }

    pub fn authors(&self) -> AuthorRepository {
        AuthorRepository::new(self.pool.clone())
    }

    pub fn publishers(&self) -> PublisherRepository {
        PublisherRepository::new(self.pool.clone())
    }

    pub fn books(&self) -> BookRepository {
        BookRepository::new(self.pool.clone())
    }

    pub fn members(&self) -> MemberRepository {
        MemberRepository::new(self.pool.clone())
    }

    /// Issue and return.
    pub fn circulations(&self) -> CirculationRepository {
        CirculationRepository::new(self.pool.clone())
    }

    pub fn penalties(&self) -> PenaltyRepository {
        PenaltyRepository::new(self.pool.clone())
    }

    /// Charts, tables, export and dashboard figures.
    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_database_is_shared_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.db");

        let db = Database::new(DbConfig::new(&path).max_connections(3))
            .await
            .unwrap();
        db.settings().get().await.unwrap();

        // Two connections held at once see the same file
        let mut first = db.pool().acquire().await.unwrap();
        let mut second = db.pool().acquire().await.unwrap();
        let seen_by_first: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM library_settings")
            .fetch_one(&mut *first)
            .await
            .unwrap();
        let seen_by_second: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM library_settings")
            .fetch_one(&mut *second)
            .await
            .unwrap();
        assert_eq!((seen_by_first, seen_by_second), (1, 1));

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&mut *first)
            .await
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[tokio::test]
    async fn test_reopening_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.notifications().record("hello").await.unwrap();
        db.close().await;

        let reopened = Database::new(DbConfig::new(&path)).await.unwrap();
        let log = reopened.notifications().list_recent(10).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].message, "hello");
    }

    #[test]
    fn test_in_memory_is_single_connection() {
        let config = DbConfig::in_memory();
        assert!(config.is_memory());
        assert_eq!(config.max_connections, 1);
        assert!(!DbConfig::new("library.db").is_memory());
    }
}
