use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::log::RequestLog;
use crate::provider::DynProvider;
use crate::store::VersionStore;

pub mod handlers;
mod logs_page;

/// Everything the handlers need, injected rather than global.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// None until an API key is configured; generation endpoints report the
    /// missing credential per request.
    pub provider: Option<DynProvider>,
    pub store: Arc<VersionStore>,
    pub log: Arc<RequestLog>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/generate", post(handlers::generate))
        .route("/fixcode", post(handlers::fixcode))
        .route("/api/logs", get(handlers::api_logs))
        .route("/logs", get(handlers::logs_page))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("relay listening on http://{addr}");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
