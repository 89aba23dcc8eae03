use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use search_engine::SearchRequest;
use tracing::{debug, error};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    routes::search::{search_request::SearchRequestBody, search_response::SearchResponse},
};

pub async fn search_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(p): Json<SearchRequestBody>,
) -> Response {
    let request_id = headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");

    debug!(
        request_id = %request_id,
        query = %p.query,
        "search_route: start"
    );

    let mut req = SearchRequest::new(p.query);
    req.filters = p.filters;
    req.platform = p.platform;
    req.category_id = p.category_id;
    if let Some(page) = p.page {
        req.page = page;
    }
    if let Some(page_size) = p.page_size {
        req.page_size = page_size;
    }
    if let Some(facets) = p.facets {
        req.with_facets = facets;
    }
    if let Some(boost) = p.boost {
        req.with_boost = boost;
    }
    if let Some(rerank) = p.rerank {
        req.with_rerank = rerank;
    }
    if let Some(k) = p.rerank_top_k {
        req.rerank_top_k = k;
    }

    match state.engine.search(&req).await {
        Ok(page) => {
            debug!(
                request_id = %request_id,
                total = page.total,
                returned = page.results.len(),
                "search_route: success"
            );
            ApiResponse::success(SearchResponse::from(page))
                .into_response_with_status(StatusCode::OK)
        }
        Err(err) => {
            error!(
                request_id = %request_id,
                error = %format!("{err}"),
                "search_route: search failed"
            );
            let resp: ApiResponse<()> =
                ApiResponse::error("SEARCH_FAILED", format!("Search failed: {err}"));
            resp.into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
