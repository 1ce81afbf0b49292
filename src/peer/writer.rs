//! Outbound half of a peer: queue and keepalive timer in, frames out.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use super::Keepalive;
use crate::domain::{Dequeued, Lifecycle, OutboundReceiver, PeerId, PeerState};
use crate::error::TransportError;
use crate::transport::{Connection, Frame};

/// Why the write loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteEnd {
    /// The coordinator closed the queue; a close frame was attempted.
    Detached,
    /// A data or ping write failed or exceeded its deadline.
    Failed(TransportError),
}

/// Runs the writer until its queue is closed or a write fails, then closes
/// the connection.
///
/// Returns the queue so the caller decides when it is released: a peer
/// whose writer has died stays registered, and its queue keeps absorbing
/// fan-out until the coordinator drops it as full.
pub async fn run<C: Connection>(
    conn: Arc<C>,
    mut queue: OutboundReceiver,
    peer_id: PeerId,
    lifecycle: Lifecycle,
    keepalive: Keepalive,
) -> (WriteEnd, OutboundReceiver) {
    let end = write_loop(conn.as_ref(), &mut queue, keepalive).await;
    conn.close().await;

    match &end {
        WriteEnd::Detached => {
            lifecycle.transition(PeerState::Detaching, PeerState::Closed);
            tracing::debug!(peer_id = %peer_id, "writer detached");
        }
        WriteEnd::Failed(e) => {
            tracing::debug!(peer_id = %peer_id, error = %e, "writer stopped");
        }
    }
    (end, queue)
}

async fn write_loop<C: Connection>(
    conn: &C,
    queue: &mut OutboundReceiver,
    keepalive: Keepalive,
) -> WriteEnd {
    let period = keepalive.ping_period();
    let deadline = keepalive.write_wait();
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            next = queue.pop() => match next {
                Dequeued::Frame(payload) => {
                    if let Err(e) = write(conn, Frame::Text(payload.to_string()), deadline).await {
                        return WriteEnd::Failed(e);
                    }
                }
                Dequeued::Closed => {
                    // Best effort: the peer is leaving either way.
                    let _ = write(conn, Frame::Close(None), deadline).await;
                    return WriteEnd::Detached;
                }
            },
            _ = ticker.tick() => {
                if let Err(e) = write(conn, Frame::Ping(Vec::new()), deadline).await {
                    return WriteEnd::Failed(e);
                }
            }
        }
    }
}

async fn write<C: Connection>(
    conn: &C,
    frame: Frame,
    deadline: Duration,
) -> Result<(), TransportError> {
    match time::timeout(deadline, conn.write_frame(frame)).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::TimedOut),
    }
}
