//! Shared application state injected into all Axum handlers.

use crate::config::RelayConfig;
use crate::hub::Hub;
use crate::peer::PeerOptions;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the fan-out coordinator.
    pub hub: Hub,
    /// Settings applied to every new peer.
    pub peer_options: PeerOptions,
    /// Largest inbound WebSocket message accepted, in bytes.
    pub max_message_bytes: usize,
}

impl AppState {
    /// Builds state for `hub` using the limits in `config`.
    #[must_use]
    pub fn new(hub: Hub, config: &RelayConfig) -> Self {
        Self {
            hub,
            peer_options: PeerOptions {
                keepalive: config.keepalive(),
                queue_capacity: config.outbound_queue_capacity,
            },
            max_message_bytes: config.max_message_bytes,
        }
    }
}
