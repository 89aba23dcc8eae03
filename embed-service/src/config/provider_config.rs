use tracing::warn;

use crate::config::provider_kind::ProviderKind;
use crate::errors::{Result, env_opt, env_opt_u64};

/// Configuration for one provider profile (embedding or rerank).
///
/// The same struct serves both profiles; they usually differ only in the
/// model identifier and generation limits.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Which backend to call.
    pub kind: ProviderKind,

    /// Model identifier (e.g. `"nomic-embed-text"`, `"text-embedding-3-small"`).
    pub model: String,

    /// Inference endpoint base URL.
    pub endpoint: String,

    /// Optional API key (required for OpenAI).
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate (completions only).
    pub max_tokens: Option<u32>,

    /// Sampling temperature (completions only).
    pub temperature: Option<f32>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    /// Loads the **embedding** profile from the environment.
    ///
    /// Returns `Ok(None)` (the provider-unavailable state) when `AI_PROVIDER`
    /// is unset or required credentials are missing. Search then degrades to
    /// "no results" and reindex jobs fail fast with a descriptive message.
    ///
    /// # Errors
    /// Returns a config error for malformed values (bad provider name, bad numbers).
    pub fn embedding_from_env() -> Result<Option<Self>> {
        Self::profile_from_env("EMBEDDING_MODEL", "nomic-embed-text", None)
    }

    /// Loads the **rerank** (completion) profile from the environment.
    ///
    /// Same unavailability semantics as [`Self::embedding_from_env`].
    ///
    /// # Errors
    /// Returns a config error for malformed values.
    pub fn rerank_from_env() -> Result<Option<Self>> {
        let max_tokens = env_opt_u64("RERANK_MAX_TOKENS")?.map(|v| v as u32);
        Self::profile_from_env("RERANK_MODEL", "qwen3:14b", max_tokens)
    }

    fn profile_from_env(
        model_var: &str,
        default_model: &str,
        max_tokens: Option<u32>,
    ) -> Result<Option<Self>> {
        let Some(raw_kind) = env_opt("AI_PROVIDER") else {
            return Ok(None);
        };
        let kind = ProviderKind::parse(&raw_kind)?;
        let timeout_secs = env_opt_u64("AI_TIMEOUT_SECS")?;
        let model = env_opt(model_var).unwrap_or_else(|| default_model.to_string());

        let cfg = match kind {
            ProviderKind::Ollama => {
                let endpoint = env_opt("OLLAMA_URL").unwrap_or_else(|| {
                    let port = env_opt("OLLAMA_PORT").unwrap_or_else(|| "11434".into());
                    format!("http://localhost:{port}")
                });
                Self {
                    kind,
                    model,
                    endpoint,
                    api_key: None,
                    max_tokens,
                    temperature: None,
                    timeout_secs,
                }
            }
            ProviderKind::OpenAi => {
                let Some(api_key) = env_opt("OPENAI_API_KEY") else {
                    warn!("AI_PROVIDER=openai but OPENAI_API_KEY is unset; provider unavailable");
                    return Ok(None);
                };
                let endpoint =
                    env_opt("OPENAI_URL").unwrap_or_else(|| "https://api.openai.com".into());
                Self {
                    kind,
                    model,
                    endpoint,
                    api_key: Some(api_key),
                    max_tokens,
                    temperature: Some(0.0),
                    timeout_secs,
                }
            }
        };

        Ok(Some(cfg))
    }
}
