//! Record search: scoped matching with optional regex, and search history.

use regex::RegexBuilder;
use tracing::debug;

use clipnote_core::{defaults, Record};

/// Which record fields a search inspects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchScope {
    /// Title, content, and summary.
    #[default]
    All,
    Title,
    Content,
    Summary,
}

/// Search behavior options.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub scope: SearchScope,
    pub case_sensitive: bool,
    /// Interpret the query as a regular expression. An invalid pattern
    /// silently degrades to plain substring matching.
    pub use_regex: bool,
}

/// A query compiled once per search pass.
pub struct SearchMatcher {
    query: String,
    options: SearchOptions,
    regex: Option<regex::Regex>,
}

impl SearchMatcher {
    pub fn new(query: &str, options: &SearchOptions) -> Self {
        let regex = if options.use_regex {
            match RegexBuilder::new(query)
                .case_insensitive(!options.case_sensitive)
                .build()
            {
                Ok(re) => Some(re),
                Err(e) => {
                    debug!(query = %query, error = %e, "Invalid regex, using substring match");
                    None
                }
            }
        } else {
            None
        };

        let query = if options.case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };

        Self {
            query,
            options: options.clone(),
            regex,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        let fields: [Option<&str>; 3] = match self.options.scope {
            SearchScope::All => [
                record.title.as_deref(),
                Some(record.content.as_str()),
                record.summary.as_deref(),
            ],
            SearchScope::Title => [record.title.as_deref(), None, None],
            SearchScope::Content => [Some(record.content.as_str()), None, None],
            SearchScope::Summary => [record.summary.as_deref(), None, None],
        };

        fields
            .iter()
            .flatten()
            .any(|field| self.matches_field(field))
    }

    fn matches_field(&self, field: &str) -> bool {
        if let Some(ref re) = self.regex {
            return re.is_match(field);
        }
        if self.options.case_sensitive {
            field.contains(&self.query)
        } else {
            field.to_lowercase().contains(&self.query)
        }
    }
}

/// Bounded, deduplicated list of past search queries, most recent first.
#[derive(Debug, Default)]
pub struct SearchHistory {
    entries: Vec<String>,
}

impl SearchHistory {
    /// Record a query: an existing entry moves to the front, the list is
    /// capped at the history limit. Blank queries are ignored.
    pub fn push(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.entries.retain(|q| q != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(defaults::SEARCH_HISTORY_LIMIT);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
