//! Adapter from the shared [`AiProfiles`] service to the engine's provider trait.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use embed_service::AiProfiles;

use crate::errors::SearchError;
use crate::provider::SemanticProvider;

/// Provider backed by the process-wide [`AiProfiles`] singleton.
#[derive(Clone)]
pub struct ProfilesProvider {
    svc: Arc<AiProfiles>,
}

impl ProfilesProvider {
    pub fn new(svc: Arc<AiProfiles>) -> Self {
        Self { svc }
    }
}

impl SemanticProvider for ProfilesProvider {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, SearchError>> + Send + 'a>> {
        Box::pin(async move {
            self.svc
                .embed(text)
                .await
                .map_err(|e| SearchError::Provider(e.to_string()))
        })
    }

    fn complete<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SearchError>> + Send + 'a>> {
        Box::pin(async move {
            self.svc
                .complete(system, user)
                .await
                .map_err(|e| SearchError::Provider(e.to_string()))
        })
    }
}
