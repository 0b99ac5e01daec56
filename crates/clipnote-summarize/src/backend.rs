//! Summarization backend trait.

use async_trait::async_trait;

use clipnote_core::{Result, Summary};

/// A summarization provider.
///
/// One call performs one summarization attempt and completes exactly once.
/// Failures are typed errors; a backend never substitutes a fallback result
/// itself, that is the service's job.
#[async_trait]
pub trait SummarizeBackend: Send + Sync {
    /// Summarize `content` into a title (≤ `title_limit` chars) and summary
    /// (≤ `summary_limit` chars) with a confidence score.
    async fn summarize(
        &self,
        content: &str,
        title_limit: usize,
        summary_limit: usize,
    ) -> Result<Summary>;

    /// Short provider name for logging.
    fn name(&self) -> &str;
}
