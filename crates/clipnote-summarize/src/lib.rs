//! # clipnote-summarize
//!
//! Summarization providers and the bounded-concurrency pipeline.
//!
//! Two backends implement the [`SummarizeBackend`] trait: a deterministic
//! local heuristic and an OpenAI-compatible remote client. The
//! [`SummarizationService`] queues requests, admits them in arrival order
//! under a concurrency cap, races each attempt against a deadline, and
//! degrades to the local heuristic when the remote path fails.

pub mod backend;
pub mod local;
pub mod openai;
pub mod service;
pub mod types;

pub use backend::SummarizeBackend;
pub use local::LocalBackend;
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use service::{Completion, ServiceConfig, SummarizationService};
