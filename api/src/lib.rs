use std::{env, error::Error, sync::Arc};

mod core;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::info;

use crate::core::app_state::AppState;
use crate::routes::{
    health_route::health_route,
    reindex::{reindex_status_route::reindex_status_route, start_reindex_route::start_reindex_route},
    search::search_route::search_route,
};

pub async fn start() -> Result<(), Box<dyn Error>> {
    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into());

    let state = Arc::new(AppState::from_env()?);

    // Optional catalog bootstrap from a JSONL dump.
    if let Ok(path) = env::var("CATALOG_SEED_PATH") {
        let applied = state.store.seed_from_jsonl(&path).await?;
        info!(path = %path, applied, "catalog seeded");
    }

    let app = Router::new()
        .route("/search", post(search_route))
        .route("/reindex", post(start_reindex_route))
        .route("/reindex/{job_id}", get(reindex_status_route))
        .route("/health", get(health_route))
        .with_state(state);

    info!(address = %host_url, "API listening");
    let listener = tokio::net::TcpListener::bind(&host_url).await?;

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
}
