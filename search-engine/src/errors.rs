//! Unified error type for the search engine.

use catalog_core::CatalogError;
use thiserror::Error;

/// Top-level error for search operations.
///
/// Provider hiccups on the query path are deliberately **not** represented
/// here: they degrade to empty results or unchanged order at the call site
/// (see `provider::EmbedOutcome` and the reranker) instead of propagating.
#[derive(Debug, Error)]
pub enum SearchError {
    /// External provider failure surfaced by an adapter.
    #[error("provider error: {0}")]
    Provider(String),

    /// Catalog store errors.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
