//! SQLite implementation of the record repository.
//!
//! Ids are stored as hyphenated uuid text, timestamps as RFC 3339 text via
//! chrono, and `ai_state` as its stable string form.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use clipnote_core::{AiPatch, AiState, Error, Record, RecordRepository, Result};

/// Record repository backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteRecordRepository {
    pool: SqlitePool,
}

impl SqliteRecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn from_row(row: &SqliteRow) -> Result<Record> {
        let id: String = row.try_get("id")?;
        let id = Uuid::parse_str(&id)
            .map_err(|e| Error::Serialization(format!("Invalid record id '{}': {}", id, e)))?;
        let ai_state: String = row.try_get("ai_state")?;

        Ok(Record {
            id,
            content: row.try_get("content")?,
            content_hash: row.try_get("content_hash")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            title: row.try_get("title")?,
            summary: row.try_get("summary")?,
            confidence: row.try_get("confidence")?,
            ai_state: AiState::parse(&ai_state),
            starred: row.try_get("starred")?,
            copied_at: row.try_get::<Option<DateTime<Utc>>, _>("copied_at")?,
        })
    }
}

#[async_trait]
impl RecordRepository for SqliteRecordRepository {
    async fn load_all(&self) -> Result<Vec<Record>> {
        let rows = sqlx::query("SELECT * FROM record ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::from_row).collect()
    }

    async fn load(&self, limit: usize, offset: usize) -> Result<Vec<Record>> {
        let rows = sqlx::query("SELECT * FROM record ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::from_row).collect()
    }

    async fn insert(&self, record: &Record) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO record
                (id, content, content_hash, created_at, title, summary,
                 confidence, ai_state, starred, copied_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.content)
        .bind(&record.content_hash)
        .bind(record.created_at)
        .bind(&record.title)
        .bind(&record.summary)
        .bind(record.confidence)
        .bind(record.ai_state.as_str())
        .bind(record.starred)
        .bind(record.copied_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_ai(&self, id: Uuid, patch: &AiPatch) -> Result<()> {
        // COALESCE keeps prior AI fields when the patch omits them, so a
        // failed attempt never erases earlier successful output.
        sqlx::query(
            r#"
            UPDATE record SET
                title      = COALESCE(?, title),
                summary    = COALESCE(?, summary),
                confidence = COALESCE(?, confidence),
                ai_state   = ?
            WHERE id = ?
            "#,
        )
        .bind(&patch.title)
        .bind(&patch.summary)
        .bind(patch.confidence)
        .bind(patch.ai_state.as_str())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn touch(&self, id: Uuid, created_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE record SET created_at = ? WHERE id = ?")
            .bind(created_at)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_starred(&self, id: Uuid, starred: bool) -> Result<()> {
        sqlx::query("UPDATE record SET starred = ? WHERE id = ?")
            .bind(starred)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM record WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM record").execute(&self.pool).await?;
        Ok(())
    }
}
