//! Domain layer: peer identity, relayed messages, lifecycle, and the
//! outbound queue that connects the coordinator to each peer's writer.

pub mod lifecycle;
pub mod message;
pub mod outbound;
pub mod peer_id;

pub use lifecycle::{Lifecycle, PeerState};
pub use message::{Message, Sender, WireMessage};
pub use outbound::{Dequeued, OutboundReceiver, OutboundSender, Payload, PushError, outbound_queue};
pub use peer_id::PeerId;
