//! WebSocket layer: the axum adapter for [`crate::transport::Connection`]
//! and the upgrade handler.
//!
//! The endpoint at `/api/connect?name=<display name>` upgrades to a
//! WebSocket and joins the relay.

pub mod connection;
pub mod handler;

pub use connection::WsConnection;
