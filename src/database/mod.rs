//! SQLite Database Module
//!
//! Authoritative `words` and `definitions` tables plus the derived
//! full-text index. Operations live on extension traits ([`WordOps`],
//! [`SearchOps`]) implemented for [`Database`].

mod migrations;
mod models;
mod search;
mod words;

pub use migrations::{get_current_version, run_migrations, SCHEMA_VERSION};
pub use models::*;
pub use search::{
    Cursor, InvalidCursor, SearchMode, SearchOps, SearchQuery, HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN,
    PAGE_SIZE,
};
pub use words::{CountMismatch, InsertReport, WordOps};

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use tracing::warn;

/// File name used when only a data directory is given.
pub const DEFAULT_DATABASE_FILE: &str = "redic.db";

/// Connection pool tuning.
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub busy_timeout: Duration,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            busy_timeout: Duration::from_secs(30),
        }
    }
}

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    path: PathBuf,
}

impl Database {
    /// Open (or create) `redic.db` inside `data_dir` and migrate it.
    pub async fn new(data_dir: &Path) -> Result<Self, sqlx::Error> {
        Self::open(&data_dir.join(DEFAULT_DATABASE_FILE), &DatabaseOptions::default()).await
    }

    /// Open (or create) the database file at `path` and migrate it.
    pub async fn open(path: &Path, options: &DatabaseOptions) -> Result<Self, sqlx::Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!(dir = %parent.display(), error = %e, "failed to create database directory");
                }
            }
        }

        let connect = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(options.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections.max(1))
            .min_connections(1)
            .connect_with(connect)
            .await?;

        let db = Self {
            pool,
            path: path.to_path_buf(),
        };

        migrations::run_migrations(&db.pool).await?;

        Ok(db)
    }

    /// Get the underlying pool for direct queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
