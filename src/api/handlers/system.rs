//! Relay status endpoints: health and roster.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Local;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::error::{ErrorResponse, RelayError};
use crate::hub::PeerSummary;

/// Body of `GET /health`.
#[derive(Debug, Serialize, ToSchema)]
struct RelayStatus {
    status: &'static str,
    version: &'static str,
    /// Peers currently registered with the coordinator.
    peers: usize,
    checked_at: String,
}

/// `GET /health`: liveness of the relay and its coordinator.
///
/// Goes through the coordinator, so a `200` also proves the registry loop
/// is still serving requests.
///
/// # Errors
///
/// Returns [`RelayError::HubUnavailable`] if the coordinator has stopped.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Relay",
    summary = "Relay status",
    responses(
        (status = 200, description = "Coordinator is serving", body = RelayStatus),
        (status = 503, description = "Coordinator is not running", body = ErrorResponse),
    )
)]
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, RelayError> {
    let roster = state.hub.roster().await?;
    let body = RelayStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        peers: roster.len(),
        checked_at: Local::now().to_rfc3339(),
    };
    Ok(Json(body))
}

/// `GET /api/peers`: id and display name of every registered peer.
///
/// # Errors
///
/// Returns [`RelayError::HubUnavailable`] if the coordinator has stopped.
#[utoipa::path(
    get,
    path = "/api/peers",
    tag = "Relay",
    summary = "Roster",
    responses(
        (status = 200, description = "Registered peers", body = Vec<PeerSummary>),
        (status = 503, description = "Coordinator is not running", body = ErrorResponse),
    )
)]
pub async fn peers_handler(State(state): State<AppState>) -> Result<impl IntoResponse, RelayError> {
    state.hub.roster().await.map(Json)
}

/// Status routes, merged into the main router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/peers", get(peers_handler))
        .route("/health", get(health_handler))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::config::RelayConfig;
    use crate::hub::Hub;

    #[tokio::test]
    async fn health_reports_zero_peers_on_fresh_hub() {
        let state = AppState::new(Hub::spawn(1), &RelayConfig::default());
        let Ok(response) = health_handler(State(state)).await else {
            panic!("health failed");
        };
        assert_eq!(response.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_is_503_without_coordinator() {
        let (hub, coordinator) = Hub::new(1);
        drop(coordinator);
        let state = AppState::new(hub, &RelayConfig::default());

        let response = health_handler(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
