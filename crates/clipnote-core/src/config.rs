//! User preferences and provider configuration.
//!
//! Explicit configuration objects constructed once at startup and passed into
//! the store and summarization service. No global singletons.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Summarization provider selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Deterministic on-device heuristic (also the universal fallback).
    #[default]
    Local,
    /// OpenAI-compatible chat-completion endpoint.
    Remote,
}

impl ProviderKind {
    /// Parse a loose string form ("local", "remote", "openai").
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "local" => Some(Self::Local),
            "remote" | "openai" => Some(Self::Remote),
            _ => None,
        }
    }
}

/// Preferences governing capture, dedup, and summarization behavior.
///
/// Values loaded from the environment are clamped to sane floors
/// (title limit ≥ 15, summary limit ≥ 50).
#[derive(Debug, Clone)]
pub struct Preferences {
    /// Whether auto-summarization of captures is enabled.
    pub enable_ai: bool,
    /// Maximum AI title length in characters.
    pub title_limit: usize,
    /// Minimum content length (chars) triggering auto-summarization.
    pub summary_trigger: usize,
    /// Maximum AI summary length in characters.
    pub summary_limit: usize,
    /// Whether the dedup window is active.
    pub dedup_enabled: bool,
    /// Dedup window in minutes.
    pub dedup_window_minutes: i64,
    /// Maximum records retained in memory.
    pub max_records: usize,
    /// Selected summarization provider.
    pub provider: ProviderKind,
    /// Base URL of the remote (or custom) endpoint.
    pub base_url: String,
    /// Model slug sent to the remote endpoint.
    pub model: String,
    /// Per-call summarization timeout.
    pub timeout: Duration,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            enable_ai: true,
            title_limit: defaults::TITLE_LIMIT,
            summary_trigger: defaults::SUMMARY_TRIGGER,
            summary_limit: defaults::SUMMARY_LIMIT,
            dedup_enabled: true,
            dedup_window_minutes: defaults::DEDUP_WINDOW_MINUTES,
            max_records: defaults::MAX_RECORDS,
            provider: ProviderKind::Local,
            base_url: defaults::OPENAI_BASE_URL.to_string(),
            model: defaults::GEN_MODEL.to_string(),
            timeout: Duration::from_secs(defaults::SUMMARIZE_TIMEOUT_SECS),
        }
    }
}

impl Preferences {
    /// Load preferences from environment variables with fallback to defaults.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CLIPNOTE_ENABLE_AI` | `true` |
    /// | `CLIPNOTE_TITLE_LIMIT` | `20` (floor 15) |
    /// | `CLIPNOTE_SUMMARY_TRIGGER` | `20` |
    /// | `CLIPNOTE_SUMMARY_LIMIT` | `100` (floor 50) |
    /// | `CLIPNOTE_DEDUP_ENABLED` | `true` |
    /// | `CLIPNOTE_DEDUP_WINDOW_MINUTES` | `10` |
    /// | `CLIPNOTE_MAX_RECORDS` | `100` |
    /// | `CLIPNOTE_AI_PROVIDER` | `local` |
    /// | `CLIPNOTE_BASE_URL` | OpenAI v1 endpoint |
    /// | `CLIPNOTE_MODEL` | `gpt-4o-mini` |
    /// | `CLIPNOTE_TIMEOUT_SECS` | `5` |
    pub fn from_env() -> Self {
        // Pick up a .env file when present.
        let _ = dotenvy::dotenv();

        let mut prefs = Self::default();

        if let Ok(v) = std::env::var("CLIPNOTE_ENABLE_AI") {
            prefs.enable_ai = v != "false" && v != "0";
        }
        if let Some(v) = parse_env::<usize>("CLIPNOTE_TITLE_LIMIT") {
            prefs.title_limit = v.max(defaults::TITLE_LIMIT_MIN);
        }
        if let Some(v) = parse_env::<usize>("CLIPNOTE_SUMMARY_TRIGGER") {
            prefs.summary_trigger = v;
        }
        if let Some(v) = parse_env::<usize>("CLIPNOTE_SUMMARY_LIMIT") {
            prefs.summary_limit = v.max(defaults::SUMMARY_LIMIT_MIN);
        }
        if let Ok(v) = std::env::var("CLIPNOTE_DEDUP_ENABLED") {
            prefs.dedup_enabled = v != "false" && v != "0";
        }
        if let Some(v) = parse_env::<i64>("CLIPNOTE_DEDUP_WINDOW_MINUTES") {
            prefs.dedup_window_minutes = v.max(0);
        }
        if let Some(v) = parse_env::<usize>("CLIPNOTE_MAX_RECORDS") {
            prefs.max_records = v.max(1);
        }
        if let Ok(v) = std::env::var("CLIPNOTE_AI_PROVIDER") {
            if let Some(kind) = ProviderKind::from_str_loose(&v) {
                prefs.provider = kind;
            } else {
                tracing::warn!(value = %v, "Invalid CLIPNOTE_AI_PROVIDER, using default");
            }
        }
        if let Ok(v) = std::env::var("CLIPNOTE_BASE_URL") {
            if !v.is_empty() {
                prefs.base_url = v;
            }
        }
        if let Ok(v) = std::env::var("CLIPNOTE_MODEL") {
            if !v.is_empty() {
                prefs.model = v;
            }
        }
        if let Some(v) = parse_env::<u64>("CLIPNOTE_TIMEOUT_SECS") {
            prefs.timeout = Duration::from_secs(v.max(1));
        }

        prefs
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
