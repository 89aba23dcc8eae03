use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    routes::reindex::reindex_response::ReindexStatusResponse,
};

/// Polling endpoint. Always answers with a coherent status: malformed and
/// unknown ids yield a `not_found` state, never an error.
pub async fn reindex_status_route(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Response {
    debug!(job_id = %job_id, "reindex_status_route");

    let status = match Uuid::parse_str(&job_id) {
        Ok(id) => match state.coordinator.status(id).await {
            Some(job) => ReindexStatusResponse::from(job),
            None => ReindexStatusResponse::not_found(&job_id),
        },
        Err(_) => ReindexStatusResponse::not_found(&job_id),
    };

    ApiResponse::success(status).into_response_with_status(StatusCode::OK)
}
