//! Persistence gateway contract for records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{AiPatch, Record};
use crate::Result;

/// Durable storage contract for records.
///
/// The store treats persistence as best-effort: in-memory state stays
/// authoritative for the session when a write fails, so implementations
/// should surface errors rather than retry internally.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Load every persisted record, most recent first.
    async fn load_all(&self) -> Result<Vec<Record>>;

    /// Load a page of records, most recent first.
    async fn load(&self, limit: usize, offset: usize) -> Result<Vec<Record>>;

    /// Persist a newly created record.
    async fn insert(&self, record: &Record) -> Result<()>;

    /// Apply a partial AI-field update to a persisted record.
    async fn update_ai(&self, id: Uuid, patch: &AiPatch) -> Result<()>;

    /// Bump a record's creation timestamp (dedup refresh).
    async fn touch(&self, id: Uuid, created_at: DateTime<Utc>) -> Result<()>;

    /// Persist the starred flag.
    async fn set_starred(&self, id: Uuid, starred: bool) -> Result<()>;

    /// Remove one record.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Remove every record.
    async fn delete_all(&self) -> Result<()>;
}
