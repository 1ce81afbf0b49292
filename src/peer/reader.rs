//! Inbound half of a peer: frames in, broadcasts out.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Message, Sender};
use crate::error::{CloseCode, TransportError};
use crate::hub::Hub;
use crate::transport::{Connection, Frame};

/// Why the read loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEnd {
    /// Remote sent a close frame.
    CloseFrame(Option<CloseCode>),
    /// Read failed or no frame arrived within the liveness window.
    Failed(TransportError),
    /// The coordinator stopped accepting broadcasts.
    HubStopped,
}

impl ReadEnd {
    /// Returns `true` if this is a routine end of session.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::CloseFrame(code) => code.unwrap_or(CloseCode::NO_STATUS).is_expected(),
            Self::Failed(e) => e.is_expected(),
            Self::HubStopped => true,
        }
    }
}

/// Runs the reader until the connection fails, then unregisters the peer
/// and closes the connection, in that order.
pub async fn run<C: Connection>(
    conn: Arc<C>,
    hub: Hub,
    sender: Sender,
    pong_wait: Duration,
) -> ReadEnd {
    let end = read_loop(conn.as_ref(), &hub, &sender, pong_wait).await;

    if end.is_expected() {
        tracing::debug!(peer_id = %sender.id, end = ?end, "reader finished");
    } else {
        tracing::warn!(peer_id = %sender.id, end = ?end, "reader closed unexpectedly");
    }

    if hub.unregister(sender.id).await.is_err() {
        tracing::debug!(peer_id = %sender.id, "hub gone before unregister");
    }
    conn.close().await;
    end
}

async fn read_loop<C: Connection>(
    conn: &C,
    hub: &Hub,
    sender: &Sender,
    pong_wait: Duration,
) -> ReadEnd {
    loop {
        let frame = match tokio::time::timeout(pong_wait, conn.read_frame()).await {
            Ok(Ok(frame)) => frame,
            Ok(Err(e)) => return ReadEnd::Failed(e),
            Err(_) => return ReadEnd::Failed(TransportError::TimedOut),
        };

        let text = match frame {
            Frame::Text(text) => text,
            Frame::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            // Liveness only; the deadline restarts on the next read.
            Frame::Ping(_) | Frame::Pong(_) => continue,
            Frame::Close(code) => return ReadEnd::CloseFrame(code),
        };

        let message = Message::new(sender.clone(), &text);
        if hub.broadcast(message).await.is_err() {
            return ReadEnd::HubStopped;
        }
    }
}
