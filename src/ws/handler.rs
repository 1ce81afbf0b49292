//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use utoipa::IntoParams;

use super::WsConnection;
use crate::app_state::AppState;
use crate::peer;

/// Query parameters accepted by the connect endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConnectParams {
    /// Display name shown next to this peer's messages. Need not be unique.
    #[serde(default)]
    pub name: String,
}

/// `GET /api/connect?name=<display name>`: upgrade to WebSocket and join
/// the relay.
#[utoipa::path(
    get,
    path = "/api/connect",
    tag = "Relay",
    summary = "Join the relay",
    description = "Upgrades the request to a WebSocket. Every text frame sent is relayed to all connected peers as a JSON record with `Sender`, `Time` and `Content` fields.",
    params(ConnectParams),
    responses(
        (status = 101, description = "Switching protocols"),
        (status = 400, description = "Not a WebSocket upgrade request"),
    )
)]
pub async fn connect_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    tracing::info!(name = %params.name, "peer connecting");
    let hub = state.hub.clone();
    let options = state.peer_options;

    ws.max_message_size(state.max_message_bytes)
        .on_failed_upgrade(|e| tracing::warn!(error = %e, "websocket upgrade failed"))
        .on_upgrade(move |socket| async move {
            let conn = WsConnection::new(socket);
            if let Err(e) = peer::connect(&hub, conn, &params.name, options).await {
                tracing::warn!(name = %params.name, error = %e, "could not attach peer");
            }
        })
}
