//! Hybrid search and ranking engine for the app directory.
//!
//! Turns a free-text query into a relevance-ordered, facet-annotated result
//! set: dynamic metadata pre-filtering, dense vector ranking, heuristic
//! keyword boosts, and optional LLM reranking, all fail-open with respect to
//! the external AI provider.
//!
//! The design is flat and splits responsibilities into focused modules;
//! [`SearchEngine`] is the single entry point recommended for application
//! code.

pub mod boost;
pub mod composer;
pub mod enrich;
pub mod errors;
pub mod facets;
pub mod provider;
pub mod rerank;
pub mod retrieve;

pub use boost::{BOOST_CEILING, BOOST_INCREMENT, BoostResult, MatchReason, boost_for_query};
pub use composer::{ComposeContext, ComposeOptions, compose};
pub use enrich::{ContentEnricher, HttpEnricher, NoopEnricher};
pub use errors::SearchError;
pub use facets::{FacetMap, FacetValue};
pub use provider::{EmbedOutcome, NoopProvider, ProfilesProvider, SemanticProvider};
pub use retrieve::{SearchCandidate, SearchConfig, SearchPage, SearchRequest};

use std::sync::Arc;

use catalog_core::CatalogStore;
use tracing::trace;

/// High-level facade wiring the store and the provider.
pub struct SearchEngine {
    cfg: SearchConfig,
    store: Arc<CatalogStore>,
    provider: Arc<dyn SemanticProvider>,
}

impl SearchEngine {
    /// Constructs an engine with default bounds.
    pub fn new(store: Arc<CatalogStore>, provider: Arc<dyn SemanticProvider>) -> Self {
        Self::with_config(SearchConfig::default(), store, provider)
    }

    /// Constructs an engine with explicit bounds.
    pub fn with_config(
        cfg: SearchConfig,
        store: Arc<CatalogStore>,
        provider: Arc<dyn SemanticProvider>,
    ) -> Self {
        Self {
            cfg,
            store,
            provider,
        }
    }

    /// Executes the full retrieval pipeline for one request.
    ///
    /// # Errors
    /// Returns store errors only; provider failures degrade per the
    /// fail-open contract.
    pub async fn search(&self, req: &SearchRequest) -> Result<SearchPage, SearchError> {
        trace!(query = %req.query, "SearchEngine::search");
        retrieve::search(&self.cfg, &self.store, self.provider.as_ref(), req).await
    }

    /// The shared catalog store.
    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// The active provider handle.
    pub fn provider(&self) -> &Arc<dyn SemanticProvider> {
        &self.provider
    }
}
