//! # clipnote-store
//!
//! The record store: a single-writer actor owning the ordered clipboard
//! record collection, with capture dedup, scoped search plus history,
//! lifecycle management of asynchronous summarizations, Markdown export,
//! and a broadcast event bus.

pub mod export;
pub mod search;
pub mod store;
pub mod testing;

pub use export::export_markdown;
pub use search::{SearchHistory, SearchMatcher, SearchOptions, SearchScope};
pub use store::{CaptureOutcome, RecordStore, StoreEvent};
