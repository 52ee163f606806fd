//! HTTP API Server
//!
//! Starts and manages the axum-based HTTP server.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use sm_instagram::InstagramService;
use sm_tiktok::TikTokService;

use crate::routes::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub tiktok: Arc<TikTokService>,
    pub instagram: Arc<InstagramService>,
    /// Shared secret for `X-API-Key`; `None` leaves the API open
    pub api_key: Option<String>,
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes(&state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn start_server<F>(addr: &str, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if state.api_key.is_none() {
        tracing::warn!("API_KEY not set, protected endpoints are open");
    }

    let app = app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
