//! Registry and fan-out coordinator.
//!
//! The [`Coordinator`] is a single task that owns the set of registered
//! peers. Everything else talks to it through a cloneable [`Hub`] handle,
//! whose requests are processed strictly one at a time in arrival order.
//! No lock guards the registry because nothing but the coordinator ever
//! touches it.

pub mod coordinator;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use utoipa::ToSchema;

use crate::domain::{Lifecycle, Message, OutboundSender, PeerId, PeerState};
use crate::error::RelayError;

pub use coordinator::Coordinator;

/// The coordinator's non-owning view of a peer: enough to deliver into its
/// queue and to mark it detached, nothing that keeps its tasks alive.
#[derive(Debug)]
pub struct PeerHandle {
    id: PeerId,
    name: Arc<str>,
    outbound: OutboundSender,
    lifecycle: Lifecycle,
}

impl PeerHandle {
    /// Bundles the coordinator-side half of a peer.
    #[must_use]
    pub const fn new(
        id: PeerId,
        name: Arc<str>,
        outbound: OutboundSender,
        lifecycle: Lifecycle,
    ) -> Self {
        Self {
            id,
            name,
            outbound,
            lifecycle,
        }
    }

    /// Registry key.
    #[must_use]
    pub const fn id(&self) -> PeerId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Closes the peer's outbound queue and marks it detaching. Consumes the
    /// handle, so a queue is closed at most once.
    fn detach(self) {
        self.lifecycle.transition(PeerState::Active, PeerState::Detaching);
        self.outbound.close();
    }
}

/// Public listing entry for a registered peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PeerSummary {
    /// Registry key.
    #[schema(value_type = String)]
    pub id: PeerId,
    /// Display name.
    pub name: String,
}

/// Requests accepted by the coordinator.
#[derive(Debug)]
pub enum HubCommand {
    /// Add a peer to the registry.
    Register(PeerHandle),
    /// Remove a peer and close its queue.
    Unregister(PeerId),
    /// Fan a message out to every registered peer.
    Broadcast(Message),
    /// Report the currently registered peers.
    Roster(oneshot::Sender<Vec<PeerSummary>>),
}

/// Cloneable handle for submitting requests to the coordinator.
///
/// Every method waits until the coordinator has accepted the request, so a
/// congested coordinator slows its callers down rather than buffering
/// without bound.
#[derive(Debug, Clone)]
pub struct Hub {
    commands: mpsc::Sender<HubCommand>,
}

impl Hub {
    /// Creates a handle and the coordinator that serves it. The coordinator
    /// does nothing until [`Coordinator::run`] is awaited.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, Coordinator) {
        let (commands, rx) = mpsc::channel(capacity.max(1));
        (Self { commands }, Coordinator::new(rx))
    }

    /// Creates a handle and spawns its coordinator on the current runtime.
    #[must_use]
    pub fn spawn(capacity: usize) -> Self {
        let (hub, coordinator) = Self::new(capacity);
        tokio::spawn(coordinator.run());
        hub
    }

    /// Adds `peer` to the registry. Registering an id that is already
    /// present leaves the existing entry in place.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::HubUnavailable`] if the coordinator has stopped.
    pub async fn register(&self, peer: PeerHandle) -> Result<(), RelayError> {
        self.submit(HubCommand::Register(peer)).await
    }

    /// Removes the peer with `id` and closes its queue. A no-op for ids
    /// that are not registered.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::HubUnavailable`] if the coordinator has stopped.
    pub async fn unregister(&self, id: PeerId) -> Result<(), RelayError> {
        self.submit(HubCommand::Unregister(id)).await
    }

    /// Delivers `message` to every peer registered when it is processed.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::HubUnavailable`] if the coordinator has stopped.
    pub async fn broadcast(&self, message: Message) -> Result<(), RelayError> {
        self.submit(HubCommand::Broadcast(message)).await
    }

    /// Lists registered peers as of the moment the request is processed.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::HubUnavailable`] if the coordinator has stopped.
    pub async fn roster(&self) -> Result<Vec<PeerSummary>, RelayError> {
        let (reply, rx) = oneshot::channel();
        self.submit(HubCommand::Roster(reply)).await?;
        rx.await.map_err(|_| RelayError::HubUnavailable)
    }

    async fn submit(&self, command: HubCommand) -> Result<(), RelayError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| RelayError::HubUnavailable)
    }
}
