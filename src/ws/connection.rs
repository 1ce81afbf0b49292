//! [`Connection`] over an upgraded axum [`WebSocket`].
//!
//! The socket is split so the reader and writer never wait on each other's
//! lock. Closing trips a [`CloseFlag`] that fails any pending read, then
//! closes the sink once.
//!
//! A browser that vanishes without a close handshake surfaces from the
//! socket as a reset or I/O error; those map to
//! [`TransportError::Disconnected`], not [`TransportError::Protocol`].

use std::error::Error as _;
use std::io;

use axum::extract::ws::{CloseFrame, Message as WsFrame, Utf8Bytes, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;

use crate::error::{CloseCode, TransportError};
use crate::transport::{CloseFlag, Connection, Frame};

/// An upgraded WebSocket shared by a peer's reader and writer.
#[derive(Debug)]
pub struct WsConnection {
    sink: Mutex<SplitSink<WebSocket, WsFrame>>,
    stream: Mutex<SplitStream<WebSocket>>,
    closed: CloseFlag,
}

impl WsConnection {
    /// Wraps an upgraded socket.
    #[must_use]
    pub fn new(socket: WebSocket) -> Self {
        let (sink, stream) = socket.split();
        Self {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
            closed: CloseFlag::new(),
        }
    }
}

impl Connection for WsConnection {
    async fn read_frame(&self) -> Result<Frame, TransportError> {
        if self.closed.is_closed() {
            return Err(TransportError::Closed);
        }
        let mut stream = self.stream.lock().await;
        tokio::select! {
            () = self.closed.closed() => Err(TransportError::Closed),
            next = stream.next() => match next {
                Some(Ok(message)) => Ok(Frame::from(message)),
                Some(Err(e)) => Err(classify(&e)),
                None => Err(TransportError::Disconnected),
            },
        }
    }

    async fn write_frame(&self, frame: Frame) -> Result<(), TransportError> {
        if self.closed.is_closed() {
            return Err(TransportError::Closed);
        }
        let mut sink = self.sink.lock().await;
        sink.send(WsFrame::from(frame))
            .await
            .map_err(|e| classify(&e))
    }

    async fn close(&self) {
        if !self.closed.close() {
            return;
        }
        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.close().await {
            tracing::debug!(error = %e, "websocket sink close failed");
        }
    }
}

/// Maps a socket error onto the transport's failure kinds.
fn classify(err: &axum::Error) -> TransportError {
    use tungstenite::error::{Error as WsError, ProtocolError};

    let Some(source) = err.source() else {
        return TransportError::Protocol(err.to_string());
    };
    if let Some(ws) = source.downcast_ref::<WsError>() {
        return match ws {
            WsError::ConnectionClosed
            | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
                TransportError::Disconnected
            }
            WsError::AlreadyClosed => TransportError::Closed,
            WsError::Io(e) if is_disconnect(e.kind()) => TransportError::Disconnected,
            other => TransportError::Protocol(other.to_string()),
        };
    }
    match source.downcast_ref::<io::Error>() {
        Some(e) if is_disconnect(e.kind()) => TransportError::Disconnected,
        _ => TransportError::Protocol(err.to_string()),
    }
}

const fn is_disconnect(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}

impl From<WsFrame> for Frame {
    fn from(message: WsFrame) -> Self {
        match message {
            WsFrame::Text(text) => Self::Text(text.as_str().to_owned()),
            WsFrame::Binary(bytes) => Self::Binary(bytes.to_vec()),
            WsFrame::Ping(bytes) => Self::Ping(bytes.to_vec()),
            WsFrame::Pong(bytes) => Self::Pong(bytes.to_vec()),
            WsFrame::Close(close) => Self::Close(close.map(|c| CloseCode(c.code))),
        }
    }
}

impl From<Frame> for WsFrame {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(text) => Self::text(text),
            Frame::Binary(bytes) => Self::binary(bytes),
            Frame::Ping(bytes) => Self::Ping(bytes.into()),
            Frame::Pong(bytes) => Self::Pong(bytes.into()),
            Frame::Close(code) => Self::Close(code.map(|c| CloseFrame {
                code: c.0,
                reason: Utf8Bytes::from_static(""),
            })),
        }
    }
}
