use super::api::{get_source, health_check, ingest_logs, AppState};
use crate::config::ServerConfig;
use crate::storage::Storage;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Routes for ingestion and read-back
pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/logs", post(ingest_logs))
        .route("/api/source", get(get_source))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown_rx` flips to true
pub async fn run_server(
    config: ServerConfig,
    storage: Arc<dyn Storage>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), std::io::Error> {
    let app = build_router(Arc::new(AppState { storage }), config.max_body_bytes);

    let listener = TcpListener::bind(&config.listen).await?;
    info!(
        addr = %config.listen,
        max_body_bytes = config.max_body_bytes,
        "Ingestion server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|&v| v).await;
            info!("Ingestion server shutting down gracefully");
        })
        .await
}
