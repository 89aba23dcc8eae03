use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use embed_service::HealthStatus;
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Serialize)]
pub struct HealthResponse {
    /// Whether an AI provider is configured at all.
    pub provider_configured: bool,
    pub providers: Vec<HealthStatus>,
}

pub async fn health_route(State(state): State<Arc<AppState>>) -> Response {
    let (provider_configured, providers) = match &state.profiles {
        Some(svc) => (true, svc.health_all().await),
        None => (false, Vec::new()),
    };

    ApiResponse::success(HealthResponse {
        provider_configured,
        providers,
    })
    .into_response_with_status(StatusCode::OK)
}
