//! Deterministic on-device summarization heuristic.

use async_trait::async_trait;

use clipnote_core::{defaults, Result, Summary};

use crate::backend::SummarizeBackend;

/// Local heuristic backend.
///
/// Returns the first `min(title_limit, 15)` characters of the content as the
/// title, an empty summary, and confidence 0.0. Used both as an explicit
/// user-selected provider and as the universal fallback target for remote
/// failures; it never fails.
#[derive(Debug, Default, Clone)]
pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SummarizeBackend for LocalBackend {
    async fn summarize(
        &self,
        content: &str,
        title_limit: usize,
        _summary_limit: usize,
    ) -> Result<Summary> {
        let cap = title_limit.min(defaults::LOCAL_TITLE_CAP);
        let title: String = content.chars().take(cap).collect();
        Ok(Summary {
            title,
            summary: String::new(),
            confidence: 0.0,
        })
    }

    fn name(&self) -> &str {
        "local"
    }
}
