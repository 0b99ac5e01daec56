//! Asynchronous summarization pipeline.
//!
//! The service owns a request queue and a dispatcher task. Callers enqueue
//! work and never block; the dispatcher admits requests strictly in arrival
//! order, holding concurrency to `max_concurrent` via a fair semaphore. Each
//! admitted request races the selected backend against a per-call deadline
//! and reports exactly one [`Completion`] on the service's completion
//! channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, OnceCell, Semaphore};
use tracing::{debug, warn};
use uuid::Uuid;

use clipnote_core::{defaults, Error, Preferences, ProviderKind, Result, SecretStore, Summary};

use crate::backend::SummarizeBackend;
use crate::local::LocalBackend;
use crate::openai::{OpenAiBackend, OpenAiConfig};

/// Configuration for the summarization service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Selected provider kind.
    pub provider: ProviderKind,
    /// Base URL for the remote (or custom) endpoint.
    pub base_url: String,
    /// Model slug for remote requests.
    pub model: String,
    /// Per-call deadline for a single summarization attempt.
    pub timeout: Duration,
    /// Maximum summarization attempts in flight at once.
    pub max_concurrent: usize,
    /// When true, any remote failure or deadline miss degrades to the local
    /// heuristic and the completion still carries `Ok`. When false, the
    /// failure surfaces as `Err` so callers can record a failed state.
    pub fallback_enabled: bool,
    /// Secret store service name for the API key lookup.
    pub secret_service: String,
    /// Secret store account name for the API key lookup.
    pub secret_account: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Local,
            base_url: defaults::OPENAI_BASE_URL.to_string(),
            model: defaults::GEN_MODEL.to_string(),
            timeout: Duration::from_secs(defaults::SUMMARIZE_TIMEOUT_SECS),
            max_concurrent: defaults::MAX_CONCURRENT_SUMMARIES,
            fallback_enabled: true,
            secret_service: defaults::SECRET_SERVICE.to_string(),
            secret_account: defaults::SECRET_ACCOUNT.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Derive a service configuration from user preferences.
    pub fn from_preferences(prefs: &Preferences) -> Self {
        Self {
            provider: prefs.provider,
            base_url: prefs.base_url.clone(),
            model: prefs.model.clone(),
            timeout: prefs.timeout,
            ..Default::default()
        }
    }

    /// Load from environment variables, on top of [`Preferences::from_env`].
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CLIPNOTE_MAX_CONCURRENT` | `3` (floor 1) |
    /// | `CLIPNOTE_FALLBACK_ENABLED` | `true` |
    pub fn from_env() -> Self {
        let mut config = Self::from_preferences(&Preferences::from_env());

        if let Some(v) = std::env::var("CLIPNOTE_MAX_CONCURRENT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            config.max_concurrent = v.max(1);
        }
        if let Ok(v) = std::env::var("CLIPNOTE_FALLBACK_ENABLED") {
            config.fallback_enabled = v != "false" && v != "0";
        }

        config
    }
}

/// A queued summarization request.
#[derive(Debug)]
struct SummarizeRequest {
    record_id: Uuid,
    content: String,
    title_limit: usize,
    summary_limit: usize,
}

/// Terminal result of one summarization request.
#[derive(Debug)]
pub struct Completion {
    /// Correlation id of the record the request was made for.
    pub record_id: Uuid,
    /// The summarization outcome. `Err` only when fallback is disabled.
    pub outcome: Result<Summary>,
    /// True when the remote attempt failed and the local heuristic supplied
    /// the result.
    pub degraded: bool,
}

struct Shared {
    config: ServiceConfig,
    secrets: Arc<dyn SecretStore>,
    semaphore: Arc<Semaphore>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    api_key: OnceCell<Option<String>>,
    backend: OnceCell<Arc<dyn SummarizeBackend>>,
    backend_override: Option<Arc<dyn SummarizeBackend>>,
}

/// Handle to the summarization pipeline. Cheap to clone.
#[derive(Clone)]
pub struct SummarizationService {
    shared: Arc<Shared>,
    request_tx: mpsc::UnboundedSender<SummarizeRequest>,
}

impl SummarizationService {
    /// Create the service and its completion stream.
    ///
    /// The dispatcher task runs until every service handle is dropped.
    pub fn new(
        config: ServiceConfig,
        secrets: Arc<dyn SecretStore>,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        Self::build(config, secrets, None)
    }

    /// Create the service with an injected backend, bypassing provider
    /// routing and credential lookup. Intended for tests.
    pub fn with_backend(
        config: ServiceConfig,
        secrets: Arc<dyn SecretStore>,
        backend: Arc<dyn SummarizeBackend>,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        Self::build(config, secrets, Some(backend))
    }

    fn build(
        config: ServiceConfig,
        secrets: Arc<dyn SecretStore>,
        backend_override: Option<Arc<dyn SummarizeBackend>>,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (request_tx, request_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            config,
            secrets,
            completion_tx,
            api_key: OnceCell::new(),
            backend: OnceCell::new(),
            backend_override,
        });

        tokio::spawn(dispatch_loop(Arc::clone(&shared), request_rx));

        (
            Self { shared, request_tx },
            completion_rx,
        )
    }

    /// Queue a summarization request for `record_id`. Never blocks; the
    /// result arrives later as a [`Completion`] on the completion channel.
    pub fn enqueue(
        &self,
        record_id: Uuid,
        content: impl Into<String>,
        title_limit: usize,
        summary_limit: usize,
    ) {
        let request = SummarizeRequest {
            record_id,
            content: content.into(),
            title_limit,
            summary_limit,
        };
        if self.request_tx.send(request).is_err() {
            warn!(record_id = %record_id, "Summarization dispatcher is gone, dropping request");
        }
    }

    /// Summarize directly, awaiting the result, under the same admission,
    /// deadline, and fallback discipline as queued requests.
    pub async fn summarize_now(
        &self,
        content: &str,
        title_limit: usize,
        summary_limit: usize,
    ) -> Result<Summary> {
        let permit = self
            .shared
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::Internal("Summarization semaphore closed".to_string()))?;
        let (outcome, _degraded) = self
            .shared
            .attempt(content, title_limit, summary_limit)
            .await;
        drop(permit);
        outcome
    }
}

async fn dispatch_loop(shared: Arc<Shared>, mut rx: mpsc::UnboundedReceiver<SummarizeRequest>) {
    // Acquiring the permit here, before spawning, keeps admission strictly
    // in arrival order.
    while let Some(request) = rx.recv().await {
        let permit = match shared.semaphore.clone().acquire_owned().await {
            Ok(p) => p,
            Err(_) => break,
        };
        let shared = Arc::clone(&shared);
        tokio::spawn(async move {
            let (outcome, degraded) = shared
                .attempt(&request.content, request.title_limit, request.summary_limit)
                .await;
            drop(permit);
            let completion = Completion {
                record_id: request.record_id,
                outcome,
                degraded,
            };
            if shared.completion_tx.send(completion).is_err() {
                debug!(record_id = %request.record_id, "Completion receiver is gone");
            }
        });
    }
}

impl Shared {
    /// One summarization attempt: backend call raced against the deadline,
    /// with the fallback policy applied. Returns the outcome and whether the
    /// local heuristic had to stand in.
    async fn attempt(
        &self,
        content: &str,
        title_limit: usize,
        summary_limit: usize,
    ) -> (Result<Summary>, bool) {
        let backend = self.resolve_backend().await;

        let result = tokio::time::timeout(
            self.config.timeout,
            backend.summarize(content, title_limit, summary_limit),
        )
        .await;

        let error = match result {
            Ok(Ok(summary)) => return (Ok(summary), false),
            Ok(Err(e)) => e,
            Err(_) => Error::ProviderTimeout(self.config.timeout.as_secs()),
        };

        warn!(
            provider = backend.name(),
            error = %error,
            fallback = self.config.fallback_enabled,
            "Summarization attempt failed"
        );

        if !self.config.fallback_enabled {
            return (Err(error), false);
        }

        // The local heuristic is infallible.
        let fallback = LocalBackend::new()
            .summarize(content, title_limit, summary_limit)
            .await;
        (fallback, true)
    }

    async fn resolve_backend(&self) -> Arc<dyn SummarizeBackend> {
        if let Some(ref backend) = self.backend_override {
            return Arc::clone(backend);
        }
        let backend = self
            .backend
            .get_or_init(|| async { self.build_backend().await })
            .await;
        Arc::clone(backend)
    }

    /// Select the backend from the provider kind, credential presence, and
    /// base URL. A configured key with a non-OpenAI base URL upgrades the
    /// Local kind to a custom remote endpoint.
    async fn build_backend(&self) -> Arc<dyn SummarizeBackend> {
        let api_key = self.cached_api_key().await;

        let use_remote = match self.config.provider {
            ProviderKind::Remote => api_key.is_some(),
            ProviderKind::Local => {
                api_key.is_some() && !self.config.base_url.contains("api.openai.com")
            }
        };

        if use_remote {
            let config = OpenAiConfig {
                base_url: self.config.base_url.clone(),
                api_key: api_key.clone(),
                model: self.config.model.clone(),
                ..Default::default()
            };
            match OpenAiBackend::new(config) {
                Ok(backend) => return Arc::new(backend),
                Err(e) => {
                    warn!(error = %e, "Remote backend unavailable, using local");
                }
            }
        }

        Arc::new(LocalBackend::new())
    }

    /// Read the API key from the secret store at most once per service.
    async fn cached_api_key(&self) -> &Option<String> {
        self.api_key
            .get_or_init(|| async {
                match self
                    .secrets
                    .read_secret(&self.config.secret_service, &self.config.secret_account)
                    .await
                {
                    Ok(key) => key,
                    Err(e) => {
                        warn!(error = %e, "Secret store read failed");
                        None
                    }
                }
            })
            .await
    }
}
