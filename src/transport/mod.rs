//! Framed transport abstraction consumed by a peer's reader and writer.
//!
//! A [`Connection`] is shared by both tasks of a peer, so every method takes
//! `&self`. Implementations must make [`Connection::close`] idempotent and
//! must make a pending [`Connection::read_frame`] fail once the connection
//! is closed from either side.

#[cfg(test)]
pub mod memory;

use std::future::Future;

use tokio::sync::watch;

use crate::error::{CloseCode, TransportError};

/// A single frame on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 data frame.
    Text(String),
    /// Binary data frame.
    Binary(Vec<u8>),
    /// Keepalive request.
    Ping(Vec<u8>),
    /// Keepalive reply.
    Pong(Vec<u8>),
    /// Close handshake, with the status code if one was given.
    Close(Option<CloseCode>),
}

/// Bidirectional framed transport for one peer.
pub trait Connection: Send + Sync + 'static {
    /// Waits for the next inbound frame.
    fn read_frame(&self) -> impl Future<Output = Result<Frame, TransportError>> + Send;

    /// Writes one frame. Callers bound this with their own deadline.
    fn write_frame(&self, frame: Frame) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Closes the connection. Safe to call any number of times.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// Exactly-once close flag that wakes every waiter when tripped.
#[derive(Debug)]
pub struct CloseFlag {
    tx: watch::Sender<bool>,
}

impl CloseFlag {
    /// Creates an untripped flag.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Trips the flag. Returns `true` only for the call that tripped it.
    pub fn close(&self) -> bool {
        self.tx.send_if_modified(|closed| {
            if *closed {
                false
            } else {
                *closed = true;
                true
            }
        })
    }

    /// Returns `true` once the flag has been tripped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the flag has been tripped.
    pub async fn closed(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so `wait_for` cannot observe a dropped channel.
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

impl Default for CloseFlag {
    fn default() -> Self {
        Self::new()
    }
}
