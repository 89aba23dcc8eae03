use std::error::Error;
use std::sync::Arc;

use catalog_core::CatalogStore;
use embed_service::AiProfiles;
use reindexer::ReindexCoordinator;
use search_engine::{
    ContentEnricher, HttpEnricher, NoopEnricher, NoopProvider, ProfilesProvider, SearchEngine,
    SemanticProvider,
};
use tracing::{info, warn};

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub engine: SearchEngine,
    pub coordinator: ReindexCoordinator,
    /// Present only when a provider is configured; `/health` reports it.
    pub profiles: Option<Arc<AiProfiles>>,
}

impl AppState {
    /// Wires the whole backend from environment variables.
    ///
    /// A deployment without provider configuration still comes up: search
    /// returns empty pages and reindex jobs fail fast with a clear message.
    ///
    /// # Errors
    /// Returns config errors for malformed (not absent) provider settings.
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        let store = Arc::new(CatalogStore::new());

        let profiles = AiProfiles::from_env()?;
        let provider: Arc<dyn SemanticProvider> = match &profiles {
            Some(svc) => {
                let (embedding, rerank) = svc.profiles();
                info!(
                    embedding_model = %embedding.model,
                    rerank_model = %rerank.model,
                    "AI provider configured"
                );
                Arc::new(ProfilesProvider::new(svc.clone()))
            }
            None => {
                warn!("running without an AI provider; search will return empty results");
                Arc::new(NoopProvider)
            }
        };

        let enricher: Arc<dyn ContentEnricher> = match HttpEnricher::new(15, 8000) {
            Ok(e) => Arc::new(e),
            Err(e) => {
                warn!(error = %e, "enricher client failed to build; enrichment disabled");
                Arc::new(NoopEnricher)
            }
        };

        let engine = SearchEngine::new(store.clone(), provider.clone());
        let coordinator = ReindexCoordinator::new(store.clone(), provider, enricher);

        Ok(Self {
            store,
            engine,
            coordinator,
            profiles,
        })
    }
}
