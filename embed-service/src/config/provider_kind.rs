use crate::errors::{AiServiceError, ConfigError};

/// Represents the backend used for embedding and completion calls.
///
/// Adding more providers in the future (e.g. Anthropic, Mistral API) is done
/// by extending this enum and the matching client in `services/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Local Ollama runtime.
    Ollama,
    /// OpenAI REST API.
    OpenAi,
}

impl ProviderKind {
    /// Parses a provider name from configuration (case-insensitive).
    ///
    /// # Errors
    /// Returns [`ConfigError::UnsupportedProvider`] for unknown names.
    pub fn parse(raw: &str) -> Result<Self, AiServiceError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" | "open_ai" => Ok(Self::OpenAi),
            other => Err(ConfigError::UnsupportedProvider(other.to_string()).into()),
        }
    }
}
