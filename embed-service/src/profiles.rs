//! Shared AI service with two active profiles: `embedding` and `rerank`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (endpoint+model+key+timeout).
//! - If the `rerank` profile is not provided, it falls back to `embedding`
//!   (same backend, chat endpoint).

use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
    sync::Arc,
};

use tokio::sync::RwLock;
use tracing::info;

use crate::config::{ProviderConfig, ProviderKind};
use crate::errors::Result;
use crate::health::{HealthService, HealthStatus};
use crate::services::{ollama::OllamaClient, openai::OpenAiClient};

/// Shared service that manages the **embedding** and **rerank** profiles.
///
/// Internally caches Ollama/OpenAI clients keyed by their configuration to
/// avoid recreating HTTP clients on each call.
pub struct AiProfiles {
    embedding: ProviderConfig,
    rerank: ProviderConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaClient>>>,
    openai: RwLock<HashMap<ClientKey, Arc<OpenAiClient>>>,

    health: HealthService,
}

impl AiProfiles {
    /// Creates a new service with the given profiles.
    ///
    /// - `embedding`: required embedding profile.
    /// - `rerank_opt`: optional completion profile; falls back to `embedding`.
    ///
    /// # Errors
    /// Returns [`AiServiceError::HttpTransport`] if the health client cannot be built.
    pub fn new(embedding: ProviderConfig, rerank_opt: Option<ProviderConfig>) -> Result<Self> {
        let rerank = rerank_opt.unwrap_or_else(|| embedding.clone());

        Ok(Self {
            embedding,
            rerank,
            ollama: RwLock::new(HashMap::new()),
            openai: RwLock::new(HashMap::new()),
            health: HealthService::new(Some(10))?,
        })
    }

    /// Builds the process-wide singleton from the environment.
    ///
    /// Returns `Ok(None)` when the deployment carries no provider
    /// configuration at all; callers must treat this as "no provider"
    /// (skip embedding / skip reranking), not as an error.
    ///
    /// # Errors
    /// Returns config errors for malformed (as opposed to absent) values.
    pub fn from_env() -> Result<Option<Arc<Self>>> {
        let Some(embedding) = ProviderConfig::embedding_from_env()? else {
            info!("no AI provider configured; semantic features disabled");
            return Ok(None);
        };
        let rerank = ProviderConfig::rerank_from_env()?;
        let svc = Self::new(embedding, rerank)?;
        Ok(Some(Arc::new(svc)))
    }

    /// Computes an embedding vector using the **embedding** profile.
    ///
    /// # Errors
    /// Returns [`AiServiceError`] if the provider call fails.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        match self.embedding.kind {
            ProviderKind::Ollama => {
                let cli = self.get_or_init_ollama(&self.embedding).await?;
                cli.embeddings(input).await
            }
            ProviderKind::OpenAi => {
                let cli = self.get_or_init_openai(&self.embedding).await?;
                cli.embeddings(input).await
            }
        }
    }

    /// Runs a `(system, user)` completion using the **rerank** profile.
    ///
    /// # Errors
    /// Returns [`AiServiceError`] if the provider call fails.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.rerank.kind {
            ProviderKind::Ollama => {
                let cli = self.get_or_init_ollama(&self.rerank).await?;
                cli.chat(system, user).await
            }
            ProviderKind::OpenAi => {
                let cli = self.get_or_init_openai(&self.rerank).await?;
                cli.chat(system, user).await
            }
        }
    }

    /// Returns a health snapshot for all distinct profiles.
    ///
    /// If the rerank profile equals the embedding profile, it is checked once.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = Vec::<ProviderConfig>::with_capacity(2);
        list.push(self.embedding.clone());
        if self.rerank != self.embedding {
            list.push(self.rerank.clone());
        }
        self.health.check_many(&list).await
    }

    /// Returns references to the current profiles `(embedding, rerank)`.
    pub fn profiles(&self) -> (&ProviderConfig, &ProviderConfig) {
        (&self.embedding, &self.rerank)
    }

    /* --------------------- Internals --------------------- */

    async fn get_or_init_ollama(&self, cfg: &ProviderConfig) -> Result<Arc<OllamaClient>> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OllamaClient::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    async fn get_or_init_openai(&self, cfg: &ProviderConfig) -> Result<Arc<OpenAiClient>> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.openai.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.openai.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OpenAiClient::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Internal cache key to identify unique client configs.
#[derive(Clone, Eq)]
struct ClientKey {
    kind: ProviderKind,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&ProviderConfig> for ClientKey {
    fn from(cfg: &ProviderConfig) -> Self {
        Self {
            kind: cfg.kind,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}

impl PartialEq for ClientKey {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.endpoint == other.endpoint
            && self.model == other.model
            && self.api_key == other.api_key
            && self.timeout == other.timeout
    }
}

impl Hash for ClientKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.endpoint.hash(state);
        self.model.hash(state);
        if let Some(ref k) = self.api_key {
            k.hash(state);
        } else {
            0usize.hash(state);
        }
        self.timeout.hash(state);
    }
}
