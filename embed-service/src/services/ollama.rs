//! Thin client for the local Ollama API.
//!
//! - `POST {endpoint}/api/embeddings` — embeddings retrieval
//! - `POST {endpoint}/api/chat`       — non-streaming chat completion
//!
//! Uses the shared [`ProviderConfig`] and requires `kind == Ollama`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::{ProviderConfig, ProviderKind};
use crate::errors::{AiServiceError, Result, make_snippet};

/// Reusable Ollama client holding one preconfigured `reqwest::Client`.
pub struct OllamaClient {
    client: reqwest::Client,
    cfg: ProviderConfig,
    url_chat: String,
    url_embeddings: String,
}

impl OllamaClient {
    /// Creates a new client from the given config.
    ///
    /// # Errors
    /// - [`AiServiceError::InvalidProvider`] if `cfg.kind` is not `Ollama`
    /// - [`AiServiceError::InvalidEndpoint`] if `cfg.endpoint` is invalid
    /// - [`AiServiceError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: ProviderConfig) -> Result<Self> {
        if cfg.kind != ProviderKind::Ollama {
            return Err(AiServiceError::InvalidProvider);
        }

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(AiServiceError::InvalidEndpoint(cfg.endpoint));
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .brotli(true)
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_chat = format!("{}/api/chat", base);
        let url_embeddings = format!("{}/api/embeddings", base);

        Ok(Self {
            client,
            cfg,
            url_chat,
            url_embeddings,
        })
    }

    /// Retrieves an embedding vector via `/api/embeddings`.
    ///
    /// # Errors
    /// - [`AiServiceError::HttpStatus`] for non-2xx responses
    /// - [`AiServiceError::HttpTransport`] for client errors
    /// - [`AiServiceError::Decode`] if the response cannot be parsed
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>> {
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            prompt: input,
        };

        debug!("POST {}", self.url_embeddings);
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

        let out: EmbeddingsResponse = resp.json().await.map_err(|e| {
            AiServiceError::Decode(format!("serde error: {e}; expected `{{ embedding: [..] }}`"))
        })?;

        Ok(out.embedding)
    }

    /// Performs a **non-streaming** chat completion via `/api/chat`.
    ///
    /// # Errors
    /// Same taxonomy as [`Self::embeddings`], plus
    /// [`AiServiceError::EmptyCompletion`] if no message comes back.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.cfg.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            options: Some(ChatOptions {
                temperature: self.cfg.temperature,
                num_predict: self.cfg.max_tokens,
            }),
        };

        debug!("POST {}", self.url_chat);
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

        let out: ChatResponse = resp.json().await.map_err(|e| {
            AiServiceError::Decode(format!("serde error: {e}; ensure `stream=false` is used"))
        })?;

        out.message
            .map(|m| m.content)
            .ok_or(AiServiceError::EmptyCompletion)
    }
}

/* ==========================
HTTP payloads & options
========================== */

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Debug, Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

/// Subset of Ollama `options`; extend as needed.
#[derive(Debug, Default, Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<OutMsg>,
}

#[derive(Debug, Deserialize)]
struct OutMsg {
    content: String,
}
