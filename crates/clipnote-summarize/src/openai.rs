//! OpenAI-compatible summarization backend.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use clipnote_core::{defaults, Error, Result, Summary};

use crate::backend::SummarizeBackend;
use crate::types::*;

/// Configuration for an OpenAI-compatible chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL of the endpoint. May already include the chat-completions
    /// path for non-standard gateways.
    pub base_url: String,
    /// Bearer token (optional for local gateways without auth).
    pub api_key: Option<String>,
    /// Model slug sent with every request.
    pub model: String,
    /// HTTP client timeout in seconds. The pipeline applies its own shorter
    /// per-call deadline on top of this.
    pub timeout_seconds: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OPENAI_BASE_URL.to_string(),
            api_key: None,
            model: defaults::GEN_MODEL.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Backend calling an OpenAI-compatible chat-completion API.
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing OpenAI backend: url={}, model={}",
            config.base_url, config.model
        );

        Ok(Self { client, config })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Resolve the chat-completions URL from the configured base.
    ///
    /// Standard bases get `/chat/completions` appended. Bases that already
    /// name the chat path, or gateway-style bases (`/paas/v4/`), are used
    /// as-is.
    fn chat_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if base.ends_with("/chat/completions") || base.contains("/paas/v4") {
            base.to_string()
        } else {
            format!("{}/chat/completions", base)
        }
    }

    /// Build a POST request with authentication if configured.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.post(url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req.header("Content-Type", "application/json")
    }

    /// Verify the endpoint is reachable and the credential is accepted.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!(
            "{}/models",
            self.config.base_url.trim_end_matches('/')
        );
        let mut req = self.client.get(&url);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Health check failed: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::Provider(format!(
                "Health check returned {}",
                response.status()
            )))
        }
    }

    fn build_messages(&self, content: &str, title_limit: usize, summary_limit: usize) -> Vec<ChatMessage> {
        let truncated = truncate_content(content, defaults::CONTENT_MAX_CHARS);
        let system = format!(
            "You are a clipboard assistant. Given a piece of copied text, produce a concise \
             title (at most {} characters) and a summary (at most {} characters), both in the \
             language of the text. Respond with strict JSON only, no markdown, in the shape: \
             {{\"title\": \"...\", \"summary\": \"...\", \"confidence\": 0.0}} where confidence \
             is your 0.0-1.0 estimate of how well the title captures the text.",
            title_limit, summary_limit
        );
        vec![
            ChatMessage {
                role: "system".to_string(),
                content: system,
            },
            ChatMessage {
                role: "user".to_string(),
                content: truncated,
            },
        ]
    }
}

/// Cap content at `max_chars` characters, appending an ellipsis marker when cut.
fn truncate_content(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        content.to_string()
    } else {
        let mut s: String = content.chars().take(max_chars).collect();
        s.push_str("...");
        s
    }
}

/// Strip markdown code fences some models wrap around JSON output.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

#[async_trait]
impl SummarizeBackend for OpenAiBackend {
    async fn summarize(
        &self,
        content: &str,
        title_limit: usize,
        summary_limit: usize,
    ) -> Result<Summary> {
        debug!(
            content_len = content.chars().count(),
            model = %self.config.model,
            "Requesting remote summarization"
        );

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: self.build_messages(content, title_limit, summary_limit),
            temperature: Some(0.3),
            max_tokens: None,
        };

        let response = self
            .build_request(&self.chat_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = match response.json::<ApiErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => "Unknown error".to_string(),
            };
            return Err(Error::Provider(format!(
                "API returned {}: {}",
                status, message
            )));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("Failed to parse response: {}", e)))?;

        let choice = result
            .choices
            .first()
            .ok_or_else(|| Error::Provider("Response contained no choices".to_string()))?;

        let payload = strip_fences(&choice.message.content);
        let summary: Summary = serde_json::from_str(payload).map_err(|e| {
            warn!(error = %e, "Model returned malformed JSON payload");
            Error::Provider(format!("Malformed model output: {}", e))
        })?;

        Ok(summary)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
