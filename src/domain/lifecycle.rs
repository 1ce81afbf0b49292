//! Peer lifecycle state machine.
//!
//! ```text
//! Connecting ──register──▶ Active ──unregister / drop──▶ Detaching ──writer done──▶ Closed
//! ```
//!
//! [`Lifecycle`] is a shared atomic cell: the coordinator moves a peer into
//! `Active` and `Detaching`, the peer's own tasks move it into `Closed`.
//! Transitions only ever go forward.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Membership state of a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum PeerState {
    /// Created, not yet registered.
    Connecting = 0,
    /// Registered; reader and writer running.
    Active = 1,
    /// Removed from the registry; outbound queue closed.
    Detaching = 2,
    /// Connection closed and both tasks exited. Terminal.
    Closed = 3,
}

impl PeerState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Connecting,
            1 => Self::Active,
            2 => Self::Detaching,
            _ => Self::Closed,
        }
    }
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connecting => "connecting",
            Self::Active => "active",
            Self::Detaching => "detaching",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Shared handle to a peer's [`PeerState`].
#[derive(Debug, Clone)]
pub struct Lifecycle(Arc<AtomicU8>);

impl Lifecycle {
    /// Creates a cell in [`PeerState::Connecting`].
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicU8::new(PeerState::Connecting as u8)))
    }

    /// Current state.
    #[must_use]
    pub fn get(&self) -> PeerState {
        PeerState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves `from` → `to` if the cell is currently in `from`.
    ///
    /// Returns `true` if this call performed the transition.
    pub fn transition(&self, from: PeerState, to: PeerState) -> bool {
        from < to
            && self
                .0
                .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
    }

    /// Forces the terminal state regardless of the current one.
    pub fn close(&self) {
        self.0.store(PeerState::Closed as u8, Ordering::Release);
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_forward_through_every_state() {
        let cell = Lifecycle::new();
        assert_eq!(cell.get(), PeerState::Connecting);
        assert!(cell.transition(PeerState::Connecting, PeerState::Active));
        assert!(cell.transition(PeerState::Active, PeerState::Detaching));
        assert!(cell.transition(PeerState::Detaching, PeerState::Closed));
        assert_eq!(cell.get(), PeerState::Closed);
    }

    #[test]
    fn transition_from_wrong_state_is_rejected() {
        let cell = Lifecycle::new();
        assert!(!cell.transition(PeerState::Active, PeerState::Detaching));
        assert_eq!(cell.get(), PeerState::Connecting);
    }

    #[test]
    fn never_moves_backwards() {
        let cell = Lifecycle::new();
        cell.close();
        assert!(!cell.transition(PeerState::Closed, PeerState::Active));
        assert_eq!(cell.get(), PeerState::Closed);
    }

    #[test]
    fn clones_share_state() {
        let a = Lifecycle::new();
        let b = a.clone();
        assert!(a.transition(PeerState::Connecting, PeerState::Active));
        assert_eq!(b.get(), PeerState::Active);
    }
}
