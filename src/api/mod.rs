//! HTTP surface: status routes, the WebSocket endpoint, and static files.

pub mod handlers;

use std::path::Path;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::connect_handler;

/// Builds the router with API routes only.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/api/connect", get(connect_handler))
        .merge(handlers::system::routes())
}

/// Builds the complete application: API routes, static front-end served
/// from `static_dir` for every other path, and HTTP tracing.
pub fn build_app(state: AppState, static_dir: &Path) -> Router {
    build_router()
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
