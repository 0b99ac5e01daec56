//! # clipnote-db
//!
//! SQLite persistence for clipnote records, implementing the
//! [`RecordRepository`] contract from `clipnote-core` with runtime-checked
//! sqlx queries.

pub mod records;

pub use records::SqliteRecordRepository;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use clipnote_core::{RecordRepository, Result};

/// Connection handle owning the pool and the schema.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database at `url` and apply the
    /// schema.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        let db = Self { pool };
        db.migrate().await?;
        info!(url = %url, "Database connected");
        Ok(db)
    }

    /// Open a private in-memory database. Pinned to a single connection so
    /// every query sees the same memory.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Record repository backed by this database.
    pub fn records(&self) -> SqliteRecordRepository {
        SqliteRecordRepository::new(self.pool.clone())
    }

    /// Record repository as a trait object for the store.
    pub fn records_dyn(&self) -> std::sync::Arc<dyn RecordRepository> {
        std::sync::Arc::new(self.records())
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS record (
                id           TEXT PRIMARY KEY,
                content      TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                created_at   TEXT NOT NULL,
                title        TEXT,
                summary      TEXT,
                confidence   REAL,
                ai_state     TEXT NOT NULL DEFAULT 'none',
                starred      INTEGER NOT NULL DEFAULT 0,
                copied_at    TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_record_hash ON record(content_hash)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_record_created ON record(created_at DESC)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
