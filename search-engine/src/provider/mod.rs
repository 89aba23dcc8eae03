//! Provider seam between the engine and the external AI backends.
//!
//! The trait is object-safe with hand-rolled boxed futures so fakes in tests
//! and the profile-backed adapter share one shape. Fail-open behavior on the
//! query path is expressed by [`EmbedOutcome`], an explicit type rather than
//! exception suppression, so degraded mode stays visible in code and tests.

pub mod noop;
pub mod profiles;

use std::future::Future;
use std::pin::Pin;

use tracing::warn;

use crate::errors::SearchError;

pub use noop::NoopProvider;
pub use profiles::ProfilesProvider;

/// Embedding + completion capability used by retrieval and reranking.
pub trait SemanticProvider: Send + Sync {
    /// Embeds arbitrary UTF-8 text (including right-to-left scripts).
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, SearchError>> + Send + 'a>>;

    /// Runs a `(system, user)` completion; used by the reranker.
    fn complete<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SearchError>> + Send + 'a>>;

    /// Whether the provider can serve calls at all. A `false` here means
    /// "no provider": skip embedding and skip reranking, never error.
    fn available(&self) -> bool {
        true
    }
}

/// Result of a fail-open embedding call on the query path.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedOutcome {
    /// A dense vector came back.
    Vector(Vec<f32>),
    /// No provider, or the provider failed; the failure has been logged.
    Unavailable,
}

/// Embeds `text`, mapping provider absence and failures to
/// [`EmbedOutcome::Unavailable`] with a log line.
pub async fn embed_or_unavailable(provider: &dyn SemanticProvider, text: &str) -> EmbedOutcome {
    if !provider.available() {
        return EmbedOutcome::Unavailable;
    }
    match provider.embed(text).await {
        Ok(v) if !v.is_empty() => EmbedOutcome::Vector(v),
        Ok(_) => {
            warn!("provider returned an empty embedding");
            EmbedOutcome::Unavailable
        }
        Err(e) => {
            warn!(error = %e, "embedding failed; degrading to empty result");
            EmbedOutcome::Unavailable
        }
    }
}
