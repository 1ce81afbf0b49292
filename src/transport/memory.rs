//! In-process duplex [`Connection`].
//!
//! [`duplex`] returns the peer-side [`MemoryConnection`] and the
//! [`MemoryRemote`] that plays the far end. Both directions are bounded,
//! so a remote that stops reading stalls the writer the same way a slow
//! browser would.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use super::{CloseFlag, Connection, Frame};
use crate::error::TransportError;

/// Creates a connected pair with `buffer` frames of slack in each direction.
#[must_use]
pub fn duplex(buffer: usize) -> (MemoryConnection, MemoryRemote) {
    let buffer = buffer.max(1);
    let (to_peer, inbound) = mpsc::channel(buffer);
    let (outbound, from_peer) = mpsc::channel(buffer);
    let closed = Arc::new(CloseFlag::new());

    let conn = MemoryConnection {
        inbound: Mutex::new(inbound),
        outbound,
        closed: Arc::clone(&closed),
    };
    let remote = MemoryRemote {
        to_peer: Some(to_peer),
        from_peer,
        closed,
    };
    (conn, remote)
}

/// Peer side of an in-memory connection.
#[derive(Debug)]
pub struct MemoryConnection {
    inbound: Mutex<mpsc::Receiver<Frame>>,
    outbound: mpsc::Sender<Frame>,
    closed: Arc<CloseFlag>,
}

impl Connection for MemoryConnection {
    async fn read_frame(&self) -> Result<Frame, TransportError> {
        if self.closed.is_closed() {
            return Err(TransportError::Closed);
        }
        let mut inbound = self.inbound.lock().await;
        tokio::select! {
            () = self.closed.closed() => Err(TransportError::Closed),
            frame = inbound.recv() => frame.ok_or(TransportError::Disconnected),
        }
    }

    async fn write_frame(&self, frame: Frame) -> Result<(), TransportError> {
        if self.closed.is_closed() {
            return Err(TransportError::Closed);
        }
        tokio::select! {
            () = self.closed.closed() => Err(TransportError::Closed),
            sent = self.outbound.send(frame) => sent.map_err(|_| TransportError::Disconnected),
        }
    }

    async fn close(&self) {
        self.closed.close();
    }
}

/// Far end of an in-memory connection.
#[derive(Debug)]
pub struct MemoryRemote {
    to_peer: Option<mpsc::Sender<Frame>>,
    from_peer: mpsc::Receiver<Frame>,
    closed: Arc<CloseFlag>,
}

impl MemoryRemote {
    /// Delivers `frame` to the peer's reader.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] once either side has closed.
    pub async fn send(&self, frame: Frame) -> Result<(), TransportError> {
        let Some(to_peer) = self.to_peer.as_ref() else {
            return Err(TransportError::Closed);
        };
        if self.closed.is_closed() {
            return Err(TransportError::Closed);
        }
        to_peer.send(frame).await.map_err(|_| TransportError::Closed)
    }

    /// Sends a text frame.
    ///
    /// # Errors
    ///
    /// See [`MemoryRemote::send`].
    pub async fn send_text(&self, text: &str) -> Result<(), TransportError> {
        self.send(Frame::Text(text.to_string())).await
    }

    /// Waits for the next frame the peer wrote. `None` once the peer side
    /// has been dropped and everything written has been read.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.from_peer.recv().await
    }

    /// Drops the inbound direction without a close frame, as a vanished
    /// browser would. The peer's next read fails with
    /// [`TransportError::Disconnected`].
    pub fn hang_up(&mut self) {
        self.to_peer = None;
    }

    /// Returns `true` once the peer side has closed the connection.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.is_closed()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_flow_both_ways() {
        let (conn, mut remote) = duplex(4);

        assert!(remote.send_text("hi").await.is_ok());
        assert_eq!(conn.read_frame().await, Ok(Frame::Text("hi".to_string())));

        assert!(conn.write_frame(Frame::Ping(Vec::new())).await.is_ok());
        assert_eq!(remote.recv().await, Some(Frame::Ping(Vec::new())));
    }

    #[tokio::test]
    async fn close_fails_pending_read_and_later_writes() {
        let (conn, remote) = duplex(1);
        let conn = Arc::new(conn);

        let reader = {
            let conn = Arc::clone(&conn);
            tokio::spawn(async move { conn.read_frame().await })
        };
        tokio::task::yield_now().await;

        conn.close().await;
        conn.close().await;

        let Ok(read) = reader.await else {
            panic!("reader task panicked");
        };
        assert_eq!(read, Err(TransportError::Closed));
        assert_eq!(
            conn.write_frame(Frame::Text("late".to_string())).await,
            Err(TransportError::Closed)
        );
        assert!(remote.is_closed());
    }

    #[tokio::test]
    async fn hang_up_reads_as_disconnect() {
        let (conn, mut remote) = duplex(1);
        remote.hang_up();
        assert_eq!(conn.read_frame().await, Err(TransportError::Disconnected));
    }
}
