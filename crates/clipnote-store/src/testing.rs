//! In-memory test fixtures.
//!
//! Always compiled so integration suites in other crates can use them.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use clipnote_core::{AiPatch, Record, RecordRepository, Result, SecretStore};

/// In-memory [`RecordRepository`] for tests.
#[derive(Debug, Default)]
pub struct MemoryRecordRepository {
    records: Mutex<Vec<Record>>,
}

impl MemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with pre-existing records.
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a stored record by id.
    pub fn get(&self, id: Uuid) -> Option<Record> {
        self.records.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }

    fn sorted_desc(&self) -> Vec<Record> {
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}

#[async_trait]
impl RecordRepository for MemoryRecordRepository {
    async fn load_all(&self) -> Result<Vec<Record>> {
        Ok(self.sorted_desc())
    }

    async fn load(&self, limit: usize, offset: usize) -> Result<Vec<Record>> {
        Ok(self
            .sorted_desc()
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn insert(&self, record: &Record) -> Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn update_ai(&self, id: Uuid, patch: &AiPatch) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if let Some(r) = records.iter_mut().find(|r| r.id == id) {
            // AI fields update only when present, matching the SQL gateway.
            if let Some(ref title) = patch.title {
                r.title = Some(title.clone());
            }
            if let Some(ref summary) = patch.summary {
                r.summary = Some(summary.clone());
            }
            if let Some(confidence) = patch.confidence {
                r.confidence = Some(confidence);
            }
            r.ai_state = patch.ai_state;
        }
        Ok(())
    }

    async fn touch(&self, id: Uuid, created_at: DateTime<Utc>) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if let Some(r) = records.iter_mut().find(|r| r.id == id) {
            r.created_at = created_at;
        }
        Ok(())
    }

    async fn set_starred(&self, id: Uuid, starred: bool) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if let Some(r) = records.iter_mut().find(|r| r.id == id) {
            r.starred = starred;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        self.records.lock().unwrap().clear();
        Ok(())
    }
}

/// [`SecretStore`] serving a fixed value.
#[derive(Debug, Default)]
pub struct StaticSecretStore {
    value: Mutex<Option<String>>,
}

impl StaticSecretStore {
    /// Store with no secret.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store always answering with `value`.
    pub fn with_key(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn read_secret(&self, _service: &str, _account: &str) -> Result<Option<String>> {
        Ok(self.value.lock().unwrap().clone())
    }

    async fn write_secret(&self, _service: &str, _account: &str, value: &str) -> Result<()> {
        *self.value.lock().unwrap() = Some(value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_repository_round_trips() {
        let repo = MemoryRecordRepository::new();
        let record = Record::new("stored");
        repo.insert(&record).await.unwrap();

        let loaded = repo.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, record.id);

        repo.delete(record.id).await.unwrap();
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn update_ai_leaves_absent_fields_alone() {
        let repo = MemoryRecordRepository::new();
        let mut record = Record::new("content");
        record.title = Some("existing".to_string());
        repo.insert(&record).await.unwrap();

        repo.update_ai(record.id, &AiPatch::failed()).await.unwrap();

        let stored = repo.get(record.id).unwrap();
        assert_eq!(stored.title.as_deref(), Some("existing"));
        assert_eq!(stored.ai_state, clipnote_core::AiState::Failed);
    }

    #[tokio::test]
    async fn static_secret_store_serves_fixed_key() {
        let store = StaticSecretStore::with_key("sk-fixed");
        let got = store.read_secret("any", "thing").await.unwrap();
        assert_eq!(got.as_deref(), Some("sk-fixed"));

        let empty = StaticSecretStore::empty();
        assert!(empty.read_secret("a", "b").await.unwrap().is_none());
    }
}
