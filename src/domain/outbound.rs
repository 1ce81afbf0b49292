//! Bounded outbound queue between the coordinator and a peer's writer.
//!
//! Wraps a [`tokio::sync::mpsc`] channel with the three operations the
//! relay needs: a non-blocking bounded push, a blocking pop that reports
//! closure as [`Dequeued::Closed`], and a close that consumes the sending
//! half so it can happen at most once.

use std::sync::Arc;

use tokio::sync::mpsc;

/// An encoded frame waiting for delivery.
pub type Payload = Arc<str>;

/// Creates a queue holding at most `capacity` frames.
///
/// A `capacity` of zero is raised to one.
#[must_use]
pub fn outbound_queue(capacity: usize) -> (OutboundSender, OutboundReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (OutboundSender { tx }, OutboundReceiver { rx })
}

/// Why a push was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PushError {
    /// Queue is at capacity; the consumer is not keeping up.
    #[error("outbound queue full")]
    Full,
    /// The receiving half is gone.
    #[error("outbound queue receiver dropped")]
    Disconnected,
}

/// Producer half. Owned by the coordinator while the peer is registered.
#[derive(Debug)]
pub struct OutboundSender {
    tx: mpsc::Sender<Payload>,
}

impl OutboundSender {
    /// Enqueues `payload` without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::Full`] when at capacity and
    /// [`PushError::Disconnected`] when the receiver has been dropped.
    pub fn try_push(&self, payload: Payload) -> Result<(), PushError> {
        self.tx.try_send(payload).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => PushError::Full,
            mpsc::error::TrySendError::Closed(_) => PushError::Disconnected,
        })
    }

    /// Closes the queue. Frames already enqueued are still delivered before
    /// the receiver observes [`Dequeued::Closed`].
    pub fn close(self) {
        drop(self.tx);
    }
}

/// Result of waiting on the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dequeued {
    /// Next frame in FIFO order.
    Frame(Payload),
    /// The queue was closed and fully drained.
    Closed,
}

/// Consumer half. Owned by the peer's writer task.
#[derive(Debug)]
pub struct OutboundReceiver {
    rx: mpsc::Receiver<Payload>,
}

impl OutboundReceiver {
    /// Waits for the next frame or for closure.
    ///
    /// Cancel safe: dropping the future never loses a frame.
    pub async fn pop(&mut self) -> Dequeued {
        match self.rx.recv().await {
            Some(payload) => Dequeued::Frame(payload),
            None => Dequeued::Closed,
        }
    }

    /// Takes a frame if one is ready, without waiting.
    pub fn try_pop(&mut self) -> Option<Dequeued> {
        match self.rx.try_recv() {
            Ok(payload) => Some(Dequeued::Frame(payload)),
            Err(mpsc::error::TryRecvError::Disconnected) => Some(Dequeued::Closed),
            Err(mpsc::error::TryRecvError::Empty) => None,
        }
    }

    /// Number of frames currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns `true` if no frames are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_fails_when_full() {
        let (tx, rx) = outbound_queue(2);
        assert!(tx.try_push(Arc::from("a")).is_ok());
        assert!(tx.try_push(Arc::from("b")).is_ok());
        assert_eq!(tx.try_push(Arc::from("c")), Err(PushError::Full));
        assert_eq!(rx.len(), 2);
    }

    #[test]
    fn push_reports_dropped_receiver() {
        let (tx, rx) = outbound_queue(2);
        drop(rx);
        assert_eq!(tx.try_push(Arc::from("a")), Err(PushError::Disconnected));
    }

    #[tokio::test]
    async fn close_drains_before_reporting_closed() {
        let (tx, mut rx) = outbound_queue(4);
        assert!(tx.try_push(Arc::from("one")).is_ok());
        assert!(tx.try_push(Arc::from("two")).is_ok());
        tx.close();

        assert_eq!(rx.pop().await, Dequeued::Frame(Arc::from("one")));
        assert_eq!(rx.pop().await, Dequeued::Frame(Arc::from("two")));
        assert!(rx.is_empty());
        assert_eq!(rx.pop().await, Dequeued::Closed);
        assert_eq!(rx.pop().await, Dequeued::Closed);
    }

    #[test]
    fn try_pop_distinguishes_empty_from_closed() {
        let (tx, mut rx) = outbound_queue(1);
        assert!(rx.is_empty());
        assert_eq!(rx.try_pop(), None);
        tx.close();
        assert_eq!(rx.try_pop(), Some(Dequeued::Closed));
    }
}
