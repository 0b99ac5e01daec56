//! The record store actor.
//!
//! A single task owns the record collection; every mutation, whether a user
//! command or a late summarization completion, is serialized through its
//! mailbox. [`RecordStore`] is the cloneable handle. Observers subscribe to
//! the [`StoreEvent`] broadcast bus.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use clipnote_core::{
    content_digest, defaults, AiPatch, AiState, Error, Preferences, Record, RecordRepository,
    Result, SecretStore, Summary,
};
use clipnote_summarize::{Completion, ServiceConfig, SummarizationService};

use crate::export::export_markdown;
use crate::search::{SearchHistory, SearchMatcher, SearchOptions};

/// Result of a capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A new record was inserted at the head.
    Added(Uuid),
    /// Identical content inside the dedup window; its timestamp was
    /// refreshed instead.
    Deduplicated(Uuid),
    /// The trimmed text was empty, nothing happened.
    Empty,
}

/// Store lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    RecordAdded(Uuid),
    RecordDeduplicated(Uuid),
    /// A summarization request was dispatched for the record.
    SummaryStarted(Uuid),
    /// The record's AI state settled (success or failure).
    SummaryApplied(Uuid),
    RecordDeleted(Uuid),
    Cleared,
}

enum StoreCmd {
    Capture {
        text: String,
        reply: oneshot::Sender<CaptureOutcome>,
    },
    List {
        reply: oneshot::Sender<Vec<Record>>,
    },
    Get {
        id: Uuid,
        reply: oneshot::Sender<Option<Record>>,
    },
    Delete {
        id: Uuid,
        reply: oneshot::Sender<bool>,
    },
    ClearAll {
        reply: oneshot::Sender<()>,
    },
    ToggleStar {
        id: Uuid,
        reply: oneshot::Sender<Option<bool>>,
    },
    MarkCopied {
        id: Uuid,
        reply: oneshot::Sender<bool>,
    },
    Resummarize {
        id: Uuid,
        reply: oneshot::Sender<bool>,
    },
    BulkResummarize {
        limit: usize,
        reply: oneshot::Sender<usize>,
    },
    Search {
        query: String,
        options: SearchOptions,
        reply: oneshot::Sender<Vec<Record>>,
    },
    SearchHistory {
        reply: oneshot::Sender<Vec<String>>,
    },
    ClearSearchHistory {
        reply: oneshot::Sender<()>,
    },
    ExportMarkdown {
        reply: oneshot::Sender<String>,
    },
    LoadPage {
        limit: usize,
        offset: usize,
        reply: oneshot::Sender<usize>,
    },
}

/// Cloneable handle to the record store actor.
#[derive(Clone)]
pub struct RecordStore {
    tx: mpsc::UnboundedSender<StoreCmd>,
    events: broadcast::Sender<StoreEvent>,
    service: SummarizationService,
    title_limit: usize,
    summary_limit: usize,
}

impl RecordStore {
    /// Start the store: build the summarization service from preferences,
    /// load persisted records, and spawn the actor task.
    pub async fn start(
        prefs: Preferences,
        repo: Arc<dyn RecordRepository>,
        secrets: Arc<dyn SecretStore>,
    ) -> Result<Self> {
        let config = ServiceConfig::from_preferences(&prefs);
        let (service, completions) = SummarizationService::new(config, secrets);
        Self::start_with(prefs, repo, service, completions).await
    }

    /// Start the store with an externally constructed summarization
    /// service. Used by tests to inject a deterministic backend.
    pub async fn start_with(
        prefs: Preferences,
        repo: Arc<dyn RecordRepository>,
        service: SummarizationService,
        completions: mpsc::UnboundedReceiver<Completion>,
    ) -> Result<Self> {
        let mut records = repo.load_all().await?;

        // Crash recovery: an in-flight request from a previous session can
        // never complete.
        for r in records.iter_mut() {
            if r.ai_state == AiState::Pending {
                r.ai_state = AiState::None;
            }
        }
        info!(count = records.len(), "Record store loaded");

        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(defaults::EVENT_BUS_CAPACITY);

        let handle = Self {
            tx,
            events: events.clone(),
            service: service.clone(),
            title_limit: prefs.title_limit,
            summary_limit: prefs.summary_limit,
        };

        let actor = StoreActor {
            prefs,
            records,
            history: SearchHistory::default(),
            repo,
            service,
            events,
        };
        tokio::spawn(actor.run(rx, completions));

        Ok(handle)
    }

    /// Subscribe to store lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Capture clipboard text as a record.
    pub async fn capture(&self, text: impl Into<String>) -> Result<CaptureOutcome> {
        self.request(|reply| StoreCmd::Capture {
            text: text.into(),
            reply,
        })
        .await
    }

    /// Snapshot of the collection, most recent first.
    pub async fn list(&self) -> Result<Vec<Record>> {
        self.request(|reply| StoreCmd::List { reply }).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Record>> {
        self.request(|reply| StoreCmd::Get { id, reply }).await
    }

    /// Delete one record. Returns false when the id is unknown.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        self.request(|reply| StoreCmd::Delete { id, reply }).await
    }

    pub async fn clear_all(&self) -> Result<()> {
        self.request(|reply| StoreCmd::ClearAll { reply }).await
    }

    /// Flip the starred flag, returning the new value.
    pub async fn toggle_star(&self, id: Uuid) -> Result<Option<bool>> {
        self.request(|reply| StoreCmd::ToggleStar { id, reply }).await
    }

    /// Record that the content was copied back to the clipboard.
    pub async fn mark_copied(&self, id: Uuid) -> Result<bool> {
        self.request(|reply| StoreCmd::MarkCopied { id, reply }).await
    }

    /// Re-run summarization for one record.
    pub async fn resummarize(&self, id: Uuid) -> Result<bool> {
        self.request(|reply| StoreCmd::Resummarize { id, reply }).await
    }

    /// Dispatch summarization for up to `limit` title-less records, in
    /// collection order. Returns how many were dispatched.
    pub async fn bulk_resummarize(&self, limit: usize) -> Result<usize> {
        self.request(|reply| StoreCmd::BulkResummarize { limit, reply })
            .await
    }

    /// Search the collection. A non-blank query is recorded in the search
    /// history; a blank query returns the whole collection.
    pub async fn search(&self, query: &str, options: SearchOptions) -> Result<Vec<Record>> {
        self.request(|reply| StoreCmd::Search {
            query: query.to_string(),
            options,
            reply,
        })
        .await
    }

    pub async fn search_history(&self) -> Result<Vec<String>> {
        self.request(|reply| StoreCmd::SearchHistory { reply }).await
    }

    pub async fn clear_search_history(&self) -> Result<()> {
        self.request(|reply| StoreCmd::ClearSearchHistory { reply })
            .await
    }

    /// Render the collection as a Markdown document.
    pub async fn export_markdown(&self) -> Result<String> {
        self.request(|reply| StoreCmd::ExportMarkdown { reply }).await
    }

    /// Append the next page of persisted records to the collection,
    /// skipping ids already present. Returns how many were appended.
    pub async fn load_page(&self, limit: usize, offset: usize) -> Result<usize> {
        self.request(|reply| StoreCmd::LoadPage {
            limit,
            offset,
            reply,
        })
        .await
    }

    /// Summarize the top search matches into a single digest.
    pub async fn search_summary(&self, query: &str) -> Result<Summary> {
        let results = self.search(query, SearchOptions::default()).await?;
        if results.is_empty() {
            return Err(Error::NotFound(format!("no records match '{}'", query)));
        }

        let joined: String = results
            .iter()
            .take(defaults::SEARCH_SUMMARY_TOP_N)
            .map(|r| r.content.as_str())
            .collect::<Vec<_>>()
            .join("\n---\n");

        self.service
            .summarize_now(&joined, self.title_limit, self.summary_limit)
            .await
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> StoreCmd) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .map_err(|_| Error::Internal("record store is closed".to_string()))?;
        rx.await
            .map_err(|_| Error::Internal("record store dropped a request".to_string()))
    }
}

struct StoreActor {
    prefs: Preferences,
    records: Vec<Record>,
    history: SearchHistory,
    repo: Arc<dyn RecordRepository>,
    service: SummarizationService,
    events: broadcast::Sender<StoreEvent>,
}

impl StoreActor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<StoreCmd>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
                Some(completion) = completions.recv() => {
                    self.apply_completion(completion);
                }
            }
        }
        debug!("Record store actor stopped");
    }

    async fn handle_command(&mut self, cmd: StoreCmd) {
        match cmd {
            StoreCmd::Capture { text, reply } => {
                let _ = reply.send(self.capture(text));
            }
            StoreCmd::List { reply } => {
                let _ = reply.send(self.records.clone());
            }
            StoreCmd::Get { id, reply } => {
                let _ = reply.send(self.records.iter().find(|r| r.id == id).cloned());
            }
            StoreCmd::Delete { id, reply } => {
                let _ = reply.send(self.delete(id));
            }
            StoreCmd::ClearAll { reply } => {
                self.clear_all();
                let _ = reply.send(());
            }
            StoreCmd::ToggleStar { id, reply } => {
                let _ = reply.send(self.toggle_star(id));
            }
            StoreCmd::MarkCopied { id, reply } => {
                let _ = reply.send(self.mark_copied(id));
            }
            StoreCmd::Resummarize { id, reply } => {
                let _ = reply.send(self.resummarize(id));
            }
            StoreCmd::BulkResummarize { limit, reply } => {
                let _ = reply.send(self.bulk_resummarize(limit));
            }
            StoreCmd::Search {
                query,
                options,
                reply,
            } => {
                let _ = reply.send(self.search(&query, &options));
            }
            StoreCmd::SearchHistory { reply } => {
                let _ = reply.send(self.history.entries().to_vec());
            }
            StoreCmd::ClearSearchHistory { reply } => {
                self.history.clear();
                let _ = reply.send(());
            }
            StoreCmd::ExportMarkdown { reply } => {
                let _ = reply.send(export_markdown(&self.records));
            }
            StoreCmd::LoadPage {
                limit,
                offset,
                reply,
            } => {
                let _ = reply.send(self.load_page(limit, offset).await);
            }
        }
    }

    fn capture(&mut self, text: String) -> CaptureOutcome {
        let text = text.trim();
        if text.is_empty() {
            return CaptureOutcome::Empty;
        }

        let hash = content_digest(text);
        let now = Utc::now();

        if self.prefs.dedup_enabled {
            let threshold = now - Duration::minutes(self.prefs.dedup_window_minutes);
            if let Some(existing) = self
                .records
                .iter_mut()
                .find(|r| r.content_hash == hash && r.created_at >= threshold)
            {
                existing.created_at = now;
                let id = existing.id;
                debug!(record_id = %id, "Duplicate capture, refreshing timestamp");
                self.persist_touch(id, now);
                self.emit(StoreEvent::RecordDeduplicated(id));
                return CaptureOutcome::Deduplicated(id);
            }
        }

        let record = Record::new(text);
        let id = record.id;
        self.persist_insert(record.clone());
        self.records.insert(0, record);

        if self.records.len() > self.prefs.max_records {
            for trimmed in self.records.split_off(self.prefs.max_records) {
                self.persist_delete(trimmed.id);
            }
        }

        self.emit(StoreEvent::RecordAdded(id));

        if self.prefs.enable_ai && text.chars().count() >= self.prefs.summary_trigger {
            self.dispatch_summarization(id);
        }

        CaptureOutcome::Added(id)
    }

    /// Mark the record pending and enqueue a summarization request.
    fn dispatch_summarization(&mut self, id: Uuid) {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return;
        };
        record.ai_state = AiState::Pending;
        let content = record.content.clone();

        self.persist_update_ai(id, AiPatch::pending());
        self.service
            .enqueue(id, content, self.prefs.title_limit, self.prefs.summary_limit);
        self.emit(StoreEvent::SummaryStarted(id));
    }

    /// Apply a late summarization completion by correlation id. The record
    /// may have been deleted while the request was in flight.
    fn apply_completion(&mut self, completion: Completion) {
        let id = completion.record_id;
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            debug!(record_id = %id, "Completion for a record no longer present");
            return;
        };

        match completion.outcome {
            Ok(summary) => {
                record.apply_summary(&summary);
                debug!(
                    record_id = %id,
                    fallback = completion.degraded,
                    "Summary applied"
                );
                self.persist_update_ai(id, AiPatch::success(&summary));
            }
            Err(e) => {
                record.mark_failed();
                warn!(record_id = %id, error = %e, "Summarization failed");
                self.persist_update_ai(id, AiPatch::failed());
            }
        }
        self.emit(StoreEvent::SummaryApplied(id));
    }

    fn delete(&mut self, id: Uuid) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return false;
        }
        self.persist_delete(id);
        self.emit(StoreEvent::RecordDeleted(id));
        true
    }

    fn clear_all(&mut self) {
        self.records.clear();
        let repo = Arc::clone(&self.repo);
        tokio::spawn(async move {
            if let Err(e) = repo.delete_all().await {
                warn!(error = %e, "Failed to clear persisted records");
            }
        });
        self.emit(StoreEvent::Cleared);
    }

    fn toggle_star(&mut self, id: Uuid) -> Option<bool> {
        let record = self.records.iter_mut().find(|r| r.id == id)?;
        record.starred = !record.starred;
        let starred = record.starred;
        let repo = Arc::clone(&self.repo);
        tokio::spawn(async move {
            if let Err(e) = repo.set_starred(id, starred).await {
                warn!(record_id = %id, error = %e, "Failed to persist star");
            }
        });
        Some(starred)
    }

    fn mark_copied(&mut self, id: Uuid) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        record.copied_at = Some(Utc::now());
        true
    }

    fn resummarize(&mut self, id: Uuid) -> bool {
        if !self.records.iter().any(|r| r.id == id) {
            return false;
        }
        self.dispatch_summarization(id);
        true
    }

    fn bulk_resummarize(&mut self, limit: usize) -> usize {
        if !self.prefs.enable_ai {
            return 0;
        }
        let targets: Vec<Uuid> = self
            .records
            .iter()
            .filter(|r| r.title.is_none() && r.ai_state != AiState::Pending)
            .take(limit)
            .map(|r| r.id)
            .collect();
        for id in &targets {
            self.dispatch_summarization(*id);
        }
        targets.len()
    }

    fn search(&mut self, query: &str, options: &SearchOptions) -> Vec<Record> {
        if query.trim().is_empty() {
            return self.records.clone();
        }
        self.history.push(query);
        let matcher = SearchMatcher::new(query, options);
        self.records
            .iter()
            .filter(|r| matcher.matches(r))
            .cloned()
            .collect()
    }

    async fn load_page(&mut self, limit: usize, offset: usize) -> usize {
        let page = match self.repo.load(limit, offset).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "Failed to load record page");
                return 0;
            }
        };

        let mut appended = 0;
        for record in page {
            if self.records.iter().any(|r| r.id == record.id) {
                continue;
            }
            self.records.push(record);
            appended += 1;
        }
        appended
    }

    fn emit(&self, event: StoreEvent) {
        // Ok(_) is subscriber count; no subscribers is fine.
        let _ = self.events.send(event);
    }

    // Persistence is fire-and-forget: failures are logged and in-memory
    // state stays authoritative.

    fn persist_insert(&self, record: Record) {
        let repo = Arc::clone(&self.repo);
        tokio::spawn(async move {
            if let Err(e) = repo.insert(&record).await {
                warn!(record_id = %record.id, error = %e, "Failed to persist record");
            }
        });
    }

    fn persist_update_ai(&self, id: Uuid, patch: AiPatch) {
        let repo = Arc::clone(&self.repo);
        tokio::spawn(async move {
            if let Err(e) = repo.update_ai(id, &patch).await {
                warn!(record_id = %id, error = %e, "Failed to persist AI fields");
            }
        });
    }

    fn persist_touch(&self, id: Uuid, at: chrono::DateTime<Utc>) {
        let repo = Arc::clone(&self.repo);
        tokio::spawn(async move {
            if let Err(e) = repo.touch(id, at).await {
                warn!(record_id = %id, error = %e, "Failed to persist timestamp refresh");
            }
        });
    }

    fn persist_delete(&self, id: Uuid) {
        let repo = Arc::clone(&self.repo);
        tokio::spawn(async move {
            if let Err(e) = repo.delete(id).await {
                warn!(record_id = %id, error = %e, "Failed to delete persisted record");
            }
        });
    }
}
