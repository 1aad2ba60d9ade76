//! Database Migrations
//!
//! Handles schema creation and versioned migrations.

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::{info, warn};

/// Current database schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    let current_version = get_current_version(pool).await?;

    info!(current_version, target_version = SCHEMA_VERSION, "Checking database migrations");

    if current_version < SCHEMA_VERSION {
        for version in (current_version + 1)..=SCHEMA_VERSION {
            run_migration(pool, version).await?;
        }

        info!("Database migrations completed successfully");
    }

    Ok(())
}

/// Get the current schema version
pub async fn get_current_version(pool: &SqlitePool) -> Result<i32, sqlx::Error> {
    let result = sqlx::query("SELECT MAX(version) as version FROM _migrations")
        .fetch_optional(pool)
        .await?;

    Ok(result
        .and_then(|row| row.try_get::<i32, _>("version").ok())
        .unwrap_or(0))
}

/// Run a specific migration version in its own transaction
async fn run_migration(pool: &SqlitePool, version: i32) -> Result<(), sqlx::Error> {
    let (name, sql) = match version {
        1 => ("dictionary_tables", MIGRATION_V1),
        2 => ("search_index", MIGRATION_V2),
        _ => {
            warn!("Unknown migration version: {}", version);
            return Ok(());
        }
    };

    info!("Applying migration v{}: {}", version, name);

    let mut tx = pool.begin().await?;

    // Whole script at once; SQL comments may contain ';'.
    sqlx::raw_sql(sql).execute(&mut *tx).await?;

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(version)
        .bind(name)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

/// Migration v1: words and their accumulated definitions
const MIGRATION_V1: &str = r#"
CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY,
    word TEXT NOT NULL,
    part_of_speech TEXT NOT NULL CHECK (part_of_speech IN ('a', 's', 'r', 'n', 'v')),
    CONSTRAINT unique_word UNIQUE (word, part_of_speech)
);

CREATE INDEX IF NOT EXISTS idx_words_word_nocase ON words(word COLLATE NOCASE);

-- One row per word, glosses accumulate '|'-joined
CREATE TABLE IF NOT EXISTS definitions (
    id INTEGER PRIMARY KEY,
    word_id INTEGER NOT NULL UNIQUE REFERENCES words(id) ON DELETE CASCADE,
    definitions TEXT NOT NULL,
    explicit INTEGER NOT NULL DEFAULT 0
)
"#;

/// Migration v2: full-text index, rebuilt wholesale by reindex
const MIGRATION_V2: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS redic_ USING fts5(definitions, word_id UNINDEXED)
"#;
