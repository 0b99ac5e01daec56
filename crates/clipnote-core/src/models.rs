//! Record model and AI lifecycle state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::digest::content_digest;

/// AI enrichment lifecycle state of a record.
///
/// `None → Pending → {Success, Failed}`; `Failed → Pending` on manual retry
/// and `Success → Pending` on explicit resummarize are the only transitions
/// out of a completed attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiState {
    /// No summarization attempt has been made.
    #[default]
    None,
    /// A summarization request is in flight.
    Pending,
    /// The last attempt produced a title/summary.
    Success,
    /// The last attempt failed; prior AI fields are preserved.
    Failed,
}

impl AiState {
    /// Stable string form used by the persistence layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// Parse the persisted string form. Unknown values map to `None` so a
    /// schema from an older build degrades instead of erroring.
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "success" => Self::Success,
            "failed" | "fail" => Self::Failed,
            _ => Self::None,
        }
    }
}

impl std::fmt::Display for AiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured summarization result.
///
/// This is also the strict JSON shape a remote model is instructed to emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub title: String,
    pub summary: String,
    pub confidence: f64,
}

/// A captured clipboard record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier, assigned at creation.
    pub id: Uuid,
    /// Original captured text. Immutable once created.
    pub content: String,
    /// Content-addressed digest used for dedup. Immutable.
    pub content_hash: String,
    /// Creation timestamp; bumped only by the dedup refresh.
    pub created_at: DateTime<Utc>,
    /// AI-generated title, absent until a summarization succeeds.
    pub title: Option<String>,
    /// AI-generated summary.
    pub summary: Option<String>,
    /// Model confidence for the summary, 0.0–1.0.
    pub confidence: Option<f64>,
    /// AI lifecycle state.
    pub ai_state: AiState,
    /// User-toggleable star, independent of AI state.
    pub starred: bool,
    /// Last time the record was copied back to the clipboard.
    pub copied_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Create a fresh record in the `None` state, digesting the content.
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let content_hash = content_digest(&content);
        Self {
            id: Uuid::new_v4(),
            content,
            content_hash,
            created_at: Utc::now(),
            title: None,
            summary: None,
            confidence: None,
            ai_state: AiState::None,
            starred: false,
            copied_at: None,
        }
    }

    /// Apply a successful summarization result.
    pub fn apply_summary(&mut self, s: &Summary) {
        self.title = Some(s.title.clone());
        self.summary = Some(s.summary.clone());
        self.confidence = Some(s.confidence);
        self.ai_state = AiState::Success;
    }

    /// Mark the last attempt as failed. Prior title/summary are kept so a
    /// record never silently loses earlier successful output.
    pub fn mark_failed(&mut self) {
        self.ai_state = AiState::Failed;
    }
}

/// Partial AI-field update for the persistence layer.
#[derive(Debug, Clone, Default)]
pub struct AiPatch {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub confidence: Option<f64>,
    pub ai_state: AiState,
}

impl AiPatch {
    /// Patch recording a successful attempt.
    pub fn success(s: &Summary) -> Self {
        Self {
            title: Some(s.title.clone()),
            summary: Some(s.summary.clone()),
            confidence: Some(s.confidence),
            ai_state: AiState::Success,
        }
    }

    /// Patch recording a failed attempt (AI fields untouched).
    pub fn failed() -> Self {
        Self {
            ai_state: AiState::Failed,
            ..Default::default()
        }
    }

    /// Patch marking a request as in flight.
    pub fn pending() -> Self {
        Self {
            ai_state: AiState::Pending,
            ..Default::default()
        }
    }
}
