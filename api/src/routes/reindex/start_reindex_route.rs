use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::Response,
};
use reindexer::{ReindexOptions, ReindexScope};
use tracing::info;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    routes::reindex::{
        reindex_request::ReindexRequestBody, reindex_response::ReindexStartResponse,
    },
};

pub async fn start_reindex_route(
    State(state): State<Arc<AppState>>,
    Json(p): Json<ReindexRequestBody>,
) -> Response {
    let scope = match p.entry_id {
        Some(id) => ReindexScope::Single(id),
        None => ReindexScope::Full,
    };

    let mut opts = ReindexOptions::default();
    if let Some(crawl) = p.crawl {
        opts.crawl = crawl;
    }
    if let Some(refresh) = p.refresh {
        opts.force_refresh = refresh;
    }
    if let Some(quick) = p.quick {
        opts.quick = quick;
    }
    if let Some(batch_size) = p.batch_size {
        opts.batch_size = batch_size;
    }
    if let Some(staleness_days) = p.staleness_days {
        opts.staleness_days = staleness_days;
    }

    let job_id = state.coordinator.start(scope, opts).await;
    info!(%job_id, ?scope, "start_reindex_route: job started");

    ApiResponse::success(ReindexStartResponse {
        job_id: job_id.to_string(),
    })
    .into_response_with_status(StatusCode::ACCEPTED)
}
