//! OpenAI service for embeddings and non-streaming chat completions.
//!
//! Endpoints are derived from `ProviderConfig::endpoint`:
//! - POST {endpoint}/v1/embeddings       — embeddings retrieval
//! - POST {endpoint}/v1/chat/completions — chat completion (non-streaming)
//!
//! Constructor validation:
//! - `cfg.kind` must be `ProviderKind::OpenAi`
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ProviderConfig, ProviderKind};
use crate::errors::{AiServiceError, ConfigError, Result, make_snippet};

/// Thin client for the OpenAI API.
#[derive(Debug)]
pub struct OpenAiClient {
    client: reqwest::Client,
    cfg: ProviderConfig,
    url_chat: String,
    url_embeddings: String,
}

impl OpenAiClient {
    /// Creates a new client from the given config.
    ///
    /// # Errors
    /// - [`AiServiceError::InvalidProvider`] if `cfg.kind` is not OpenAI
    /// - [`ConfigError::MissingVar`] if `cfg.api_key` is `None`
    /// - [`AiServiceError::InvalidEndpoint`] if `cfg.endpoint` is invalid
    /// - [`AiServiceError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: ProviderConfig) -> Result<Self> {
        if cfg.kind != ProviderKind::OpenAi {
            return Err(AiServiceError::InvalidProvider);
        }

        let api_key = cfg
            .api_key
            .clone()
            .ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(AiServiceError::InvalidEndpoint(cfg.endpoint.clone()));
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| AiServiceError::Decode(format!("invalid API key header: {e}")))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_chat = format!("{}/v1/chat/completions", base);
        let url_embeddings = format!("{}/v1/embeddings", base);

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = cfg.timeout_secs.unwrap_or(60),
            "OpenAiClient initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
            url_embeddings,
        })
    }

    /// Retrieves a single embedding vector via `/v1/embeddings`.
    ///
    /// # Errors
    /// - [`AiServiceError::HttpStatus`] for non-2xx responses
    /// - [`AiServiceError::HttpTransport`] for client/network failures
    /// - [`AiServiceError::Decode`] if the JSON cannot be parsed or has no data
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>> {
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            input,
        };

        debug!(model = %self.cfg.model, input_len = input.len(), "POST {}", self.url_embeddings);
        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_embeddings.clone();
            let text = resp.text().await.unwrap_or_default();
            return Err(AiServiceError::HttpStatus {
                status,
                url,
                snippet: make_snippet(&text),
            });
        }

        let out: EmbeddingsResponse = resp
            .json()
            .await
            .map_err(|e| AiServiceError::Decode(format!("serde error: {e}")))?;

        out.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AiServiceError::Decode("empty embeddings data".into()))
    }

    /// Performs a **non-streaming** chat completion (`/v1/chat/completions`).
    ///
    /// The `messages` array is minimal: an optional system message followed by
    /// the user message with `prompt`.
    ///
    /// # Errors
    /// - [`AiServiceError::HttpStatus`] for non-2xx responses
    /// - [`AiServiceError::Decode`] if the JSON cannot be parsed
    /// - [`AiServiceError::EmptyCompletion`] if no choices are returned
    pub async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let started = Instant::now();
        let body = ChatCompletionRequest::from_cfg(&self.cfg, system, user);

        debug!(
            model = %self.cfg.model,
            prompt_len = user.len(),
            "POST {}", self.url_chat
        );

        let resp = self.client.post(&self.url_chat).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            return Err(AiServiceError::HttpStatus {
                status,
                url,
                snippet: make_snippet(&text),
            });
        }

        let out: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| AiServiceError::Decode(format!("serde error: {e}")))?;

        let text = out
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(AiServiceError::EmptyCompletion)?;

        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "chat completion done");
        Ok(text)
    }
}

/* ==========================
HTTP payloads
========================== */

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingsDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsDatum {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMsg<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_cfg(cfg: &'a ProviderConfig, system: &'a str, user: &'a str) -> Self {
        Self {
            model: &cfg.model,
            messages: vec![
                ChatMsg {
                    role: "system",
                    content: system,
                },
                ChatMsg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMsg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMsg,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMsg {
    content: String,
}
