//! # relay-hub
//!
//! WebSocket chat relay: every message a peer sends is fanned out to every
//! connected peer.
//!
//! A single coordinator task owns the registry of connected peers and
//! serializes registration, removal and fan-out. Each peer runs a reader
//! (inbound frames to broadcasts) and a writer (outbound queue and
//! keepalive pings to frames). Fan-out never blocks: a peer whose bounded
//! queue is full is dropped.
//!
//! ## Architecture
//!
//! ```text
//! Browsers (WebSocket)
//!     │
//!     ├── Upgrade handler (ws/)
//!     │
//!     ├── Peer reader / writer (peer/)   ── Connection (transport/)
//!     │        │            ▲
//!     │    broadcast    outbound queue (domain/)
//!     │        ▼            │
//!     └── Coordinator (hub/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod hub;
pub mod peer;
pub mod transport;
pub mod ws;
