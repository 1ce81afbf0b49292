//! The coordinator loop.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::{HubCommand, PeerHandle, PeerSummary};
use crate::domain::{Message, PeerId, PeerState, PushError};

/// Single owner of the peer registry.
///
/// Processes [`HubCommand`]s one at a time. Fan-out never waits on a peer:
/// a peer whose queue cannot take the next frame is removed on the spot.
#[derive(Debug)]
pub struct Coordinator {
    commands: mpsc::Receiver<HubCommand>,
    peers: HashMap<PeerId, PeerHandle>,
}

impl Coordinator {
    pub(super) fn new(commands: mpsc::Receiver<HubCommand>) -> Self {
        Self {
            commands,
            peers: HashMap::new(),
        }
    }

    /// Serves requests until every [`super::Hub`] handle has been dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            self.handle(command);
        }
        tracing::debug!(members = self.peers.len(), "hub stopped");
    }

    fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register(peer) => self.register(peer),
            HubCommand::Unregister(id) => self.unregister(id),
            HubCommand::Broadcast(message) => self.broadcast(&message),
            HubCommand::Roster(reply) => {
                // The caller may have given up waiting.
                let _ = reply.send(self.roster());
            }
        }
    }

    fn register(&mut self, peer: PeerHandle) {
        if self.peers.contains_key(&peer.id) {
            tracing::debug!(peer_id = %peer.id, "peer already registered");
            return;
        }
        peer.lifecycle.transition(PeerState::Connecting, PeerState::Active);
        tracing::info!(
            peer_id = %peer.id,
            name = %peer.name,
            members = self.peers.len() + 1,
            "registered peer"
        );
        self.peers.insert(peer.id, peer);
    }

    fn unregister(&mut self, id: PeerId) {
        let Some(peer) = self.peers.remove(&id) else {
            return;
        };
        tracing::info!(
            peer_id = %id,
            name = %peer.name,
            members = self.peers.len(),
            "unregistered peer"
        );
        peer.detach();
    }

    fn broadcast(&mut self, message: &Message) {
        let payload = match message.encode() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    sender = %message.sender().name,
                    error = %e,
                    "failed to encode message; broadcast abandoned"
                );
                return;
            }
        };
        tracing::debug!(
            sender = %message.sender().name,
            members = self.peers.len(),
            "broadcasting message"
        );

        let stalled: Vec<(PeerId, PushError)> = self
            .peers
            .values()
            .filter_map(|peer| {
                peer.outbound
                    .try_push(Arc::clone(&payload))
                    .err()
                    .map(|e| (peer.id, e))
            })
            .collect();

        for (id, reason) in stalled {
            if let Some(peer) = self.peers.remove(&id) {
                tracing::warn!(
                    peer_id = %id,
                    name = %peer.name,
                    reason = %reason,
                    "dropping peer that cannot keep up"
                );
                peer.detach();
            }
        }
    }

    fn roster(&self) -> Vec<PeerSummary> {
        self.peers
            .values()
            .map(|peer| PeerSummary {
                id: peer.id,
                name: peer.name.to_string(),
            })
            .collect()
    }
}
