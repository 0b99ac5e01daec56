//! Integration tests for the SQLite record repository.

use chrono::{Duration, Utc};

use clipnote_core::{AiPatch, AiState, Record, RecordRepository, Summary};
use clipnote_db::Database;

async fn repo() -> (Database, clipnote_db::SqliteRecordRepository) {
    let db = Database::connect_in_memory().await.unwrap();
    let repo = db.records();
    (db, repo)
}

fn summary() -> Summary {
    Summary {
        title: "A title".to_string(),
        summary: "A summary.".to_string(),
        confidence: 0.85,
    }
}

#[tokio::test]
async fn insert_and_load_round_trips_all_fields() {
    let (_db, repo) = repo().await;

    let mut record = Record::new("captured content");
    record.apply_summary(&summary());
    record.starred = true;
    record.copied_at = Some(Utc::now());
    repo.insert(&record).await.unwrap();

    let loaded = repo.load_all().await.unwrap();
    assert_eq!(loaded.len(), 1);
    let got = &loaded[0];
    assert_eq!(got.id, record.id);
    assert_eq!(got.content, "captured content");
    assert_eq!(got.content_hash, record.content_hash);
    assert_eq!(got.title.as_deref(), Some("A title"));
    assert_eq!(got.summary.as_deref(), Some("A summary."));
    assert_eq!(got.confidence, Some(0.85));
    assert_eq!(got.ai_state, AiState::Success);
    assert!(got.starred);
    assert!(got.copied_at.is_some());
}

#[tokio::test]
async fn load_all_orders_most_recent_first() {
    let (_db, repo) = repo().await;

    let mut older = Record::new("older");
    older.created_at = Utc::now() - Duration::minutes(5);
    let newer = Record::new("newer");
    repo.insert(&older).await.unwrap();
    repo.insert(&newer).await.unwrap();

    let loaded = repo.load_all().await.unwrap();
    assert_eq!(loaded[0].content, "newer");
    assert_eq!(loaded[1].content, "older");
}

#[tokio::test]
async fn load_paginates() {
    let (_db, repo) = repo().await;

    let now = Utc::now();
    for i in 0..5 {
        let mut r = Record::new(format!("record {}", i));
        r.created_at = now - Duration::minutes(i);
        repo.insert(&r).await.unwrap();
    }

    let first = repo.load(2, 0).await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].content, "record 0");

    let second = repo.load(2, 2).await.unwrap();
    assert_eq!(second[0].content, "record 2");

    let tail = repo.load(10, 4).await.unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].content, "record 4");
}

#[tokio::test]
async fn update_ai_success_sets_all_fields() {
    let (_db, repo) = repo().await;

    let record = Record::new("to summarize");
    repo.insert(&record).await.unwrap();

    repo.update_ai(record.id, &AiPatch::pending()).await.unwrap();
    let pending = &repo.load_all().await.unwrap()[0];
    assert_eq!(pending.ai_state, AiState::Pending);

    repo.update_ai(record.id, &AiPatch::success(&summary()))
        .await
        .unwrap();
    let done = &repo.load_all().await.unwrap()[0];
    assert_eq!(done.ai_state, AiState::Success);
    assert_eq!(done.title.as_deref(), Some("A title"));
}

#[tokio::test]
async fn update_ai_failed_preserves_prior_fields() {
    let (_db, repo) = repo().await;

    let mut record = Record::new("had a summary once");
    record.apply_summary(&summary());
    repo.insert(&record).await.unwrap();

    repo.update_ai(record.id, &AiPatch::failed()).await.unwrap();

    let got = &repo.load_all().await.unwrap()[0];
    assert_eq!(got.ai_state, AiState::Failed);
    assert_eq!(got.title.as_deref(), Some("A title"));
    assert_eq!(got.summary.as_deref(), Some("A summary."));
    assert_eq!(got.confidence, Some(0.85));
}

#[tokio::test]
async fn touch_updates_timestamp() {
    let (_db, repo) = repo().await;

    let record = Record::new("touch me");
    repo.insert(&record).await.unwrap();

    let later = record.created_at + Duration::minutes(3);
    repo.touch(record.id, later).await.unwrap();

    let got = &repo.load_all().await.unwrap()[0];
    assert_eq!(got.created_at, later);
}

#[tokio::test]
async fn set_starred_persists_flag() {
    let (_db, repo) = repo().await;

    let record = Record::new("star this");
    repo.insert(&record).await.unwrap();

    repo.set_starred(record.id, true).await.unwrap();
    assert!(repo.load_all().await.unwrap()[0].starred);

    repo.set_starred(record.id, false).await.unwrap();
    assert!(!repo.load_all().await.unwrap()[0].starred);
}

#[tokio::test]
async fn delete_removes_one_record() {
    let (_db, repo) = repo().await;

    let keep = Record::new("keep");
    let drop = Record::new("drop");
    repo.insert(&keep).await.unwrap();
    repo.insert(&drop).await.unwrap();

    repo.delete(drop.id).await.unwrap();

    let loaded = repo.load_all().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, keep.id);
}

#[tokio::test]
async fn delete_all_empties_table() {
    let (_db, repo) = repo().await;

    repo.insert(&Record::new("one")).await.unwrap();
    repo.insert(&Record::new("two")).await.unwrap();
    repo.delete_all().await.unwrap();

    assert!(repo.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn file_backed_database_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clipnote.db");
    let url = format!("sqlite://{}", path.display());

    let record = Record::new("durable content");
    {
        let db = Database::connect(&url).await.unwrap();
        db.records().insert(&record).await.unwrap();
    }

    let db = Database::connect(&url).await.unwrap();
    let loaded = db.records().load_all().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, record.id);
}
