//! Provider stub for deployments without AI configuration.

use std::future::Future;
use std::pin::Pin;

use crate::errors::SearchError;
use crate::provider::SemanticProvider;

/// Always-unavailable provider. Search degrades to empty results and
/// reranking is skipped entirely.
#[derive(Default, Clone, Copy)]
pub struct NoopProvider;

impl SemanticProvider for NoopProvider {
    fn embed<'a>(
        &'a self,
        _text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, SearchError>> + Send + 'a>> {
        Box::pin(async { Err(SearchError::Provider("no provider configured".into())) })
    }

    fn complete<'a>(
        &'a self,
        _system: &'a str,
        _user: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SearchError>> + Send + 'a>> {
        Box::pin(async { Err(SearchError::Provider("no provider configured".into())) })
    }

    fn available(&self) -> bool {
        false
    }
}
