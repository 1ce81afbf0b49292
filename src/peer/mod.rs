//! Connected peers: the connection-establishment entry point and the
//! reader/writer task pair that runs for every peer.
//!
//! The two tasks share nothing but the [`Connection`] and, indirectly
//! through the coordinator, the outbound queue. Only the reader asks the
//! coordinator to unregister; a writer that fails just closes the
//! connection, which in turn ends the reader.

pub mod keepalive;
pub mod reader;
pub mod writer;

use std::sync::Arc;

use tokio::task::JoinHandle;

pub use keepalive::Keepalive;
pub use reader::ReadEnd;
pub use writer::WriteEnd;

use crate::domain::{Lifecycle, OutboundReceiver, PeerId, PeerState, Sender, outbound_queue};
use crate::error::RelayError;
use crate::hub::{Hub, PeerHandle};
use crate::transport::Connection;

/// Default capacity of a peer's outbound queue.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Per-peer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerOptions {
    /// Keepalive and write-deadline timing.
    pub keepalive: Keepalive,
    /// Outbound queue capacity.
    pub queue_capacity: usize,
}

impl Default for PeerOptions {
    fn default() -> Self {
        Self {
            keepalive: Keepalive::default(),
            queue_capacity: OUTBOUND_QUEUE_CAPACITY,
        }
    }
}

/// A running peer. Dropping it does not stop the peer.
#[derive(Debug)]
pub struct PeerSession {
    id: PeerId,
    lifecycle: Lifecycle,
    finished: JoinHandle<()>,
}

impl PeerSession {
    /// The peer's registry key.
    #[must_use]
    pub const fn id(&self) -> PeerId {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PeerState {
        self.lifecycle.get()
    }

    /// Waits until both tasks have exited and the connection is closed.
    pub async fn closed(self) {
        if let Err(e) = self.finished.await {
            tracing::error!(peer_id = %self.id, error = %e, "peer supervisor failed");
        }
    }
}

/// Wraps an upgraded connection in a peer: registers it with `hub`, then
/// starts its reader and writer.
///
/// # Errors
///
/// Returns [`RelayError::HubUnavailable`] if the coordinator has stopped; the
/// connection is closed and no tasks are started.
pub async fn connect<C: Connection>(
    hub: &Hub,
    conn: C,
    name: &str,
    options: PeerOptions,
) -> Result<PeerSession, RelayError> {
    let id = PeerId::new();
    let name: Arc<str> = Arc::from(name);
    let (outbound, queue) = outbound_queue(options.queue_capacity);
    let lifecycle = Lifecycle::new();

    let handle = PeerHandle::new(id, Arc::clone(&name), outbound, lifecycle.clone());
    if let Err(e) = hub.register(handle).await {
        conn.close().await;
        return Err(e);
    }

    let conn = Arc::new(conn);
    let writer = tokio::spawn(writer::run(
        Arc::clone(&conn),
        queue,
        id,
        lifecycle.clone(),
        options.keepalive,
    ));
    let reader = tokio::spawn(reader::run(
        conn,
        hub.clone(),
        Sender { id, name },
        options.keepalive.pong_wait(),
    ));
    let finished = tokio::spawn(supervise(id, writer, reader, lifecycle.clone()));

    Ok(PeerSession {
        id,
        lifecycle,
        finished,
    })
}

async fn supervise(
    id: PeerId,
    writer: JoinHandle<(WriteEnd, OutboundReceiver)>,
    reader: JoinHandle<ReadEnd>,
    lifecycle: Lifecycle,
) {
    // The queue returned by the writer stays alive until the reader is done.
    let (written, read) = tokio::join!(writer, reader);
    if let Err(e) = &written {
        tracing::error!(peer_id = %id, error = %e, "writer task failed");
    }
    if let Err(e) = &read {
        tracing::error!(peer_id = %id, error = %e, "reader task failed");
    }
    drop(written);
    lifecycle.close();
    tracing::debug!(peer_id = %id, "peer closed");
}
