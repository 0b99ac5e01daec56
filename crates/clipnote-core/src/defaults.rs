//! Centralized default constants for clipnote.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// SUMMARIZATION
// =============================================================================

/// Maximum length of an AI-generated title in characters.
pub const TITLE_LIMIT: usize = 20;

/// Floor applied when loading the title limit from configuration.
pub const TITLE_LIMIT_MIN: usize = 15;

/// Characters of content the local heuristic keeps for the title, at most.
pub const LOCAL_TITLE_CAP: usize = 15;

/// Maximum length of an AI-generated summary in characters.
pub const SUMMARY_LIMIT: usize = 100;

/// Floor applied when loading the summary limit from configuration.
pub const SUMMARY_LIMIT_MIN: usize = 50;

/// Minimum content length (chars) that triggers auto-summarization.
pub const SUMMARY_TRIGGER: usize = 20;

/// Maximum characters of content sent to a remote provider; longer input is
/// truncated before the request is built.
pub const CONTENT_MAX_CHARS: usize = 8000;

/// Per-call summarization timeout in seconds.
pub const SUMMARIZE_TIMEOUT_SECS: u64 = 5;

/// Maximum concurrently in-flight provider calls.
pub const MAX_CONCURRENT_SUMMARIES: usize = 3;

/// Records processed per bulk-resummarize invocation.
pub const BULK_RESUMMARIZE_BATCH: usize = 3;

// =============================================================================
// PROVIDER
// =============================================================================

/// Default OpenAI-compatible API endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default generation model.
pub const GEN_MODEL: &str = "gpt-4o-mini";

/// Secret-store service name under which the provider API key is filed.
pub const SECRET_SERVICE: &str = "clipnote";

/// Secret-store account name for the provider API key.
pub const SECRET_ACCOUNT: &str = "api_key";

// =============================================================================
// RECORD STORE
// =============================================================================

/// Maximum records retained in memory (tail-trimmed on capture).
pub const MAX_RECORDS: usize = 100;

/// Dedup window in minutes: a re-capture of identical content inside this
/// window refreshes the existing record's timestamp instead of inserting.
pub const DEDUP_WINDOW_MINUTES: i64 = 10;

/// Maximum retained search-history entries.
pub const SEARCH_HISTORY_LIMIT: usize = 20;

/// Default page size for paginated record loading.
pub const PAGE_LIMIT: usize = 50;

/// Search results included when generating an AI search summary.
pub const SEARCH_SUMMARY_TOP_N: usize = 10;

// =============================================================================
// EVENTS
// =============================================================================

/// Store event broadcast channel capacity.
pub const EVENT_BUS_CAPACITY: usize = 256;
