//! Relayed chat message and its wire encoding.

use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::PeerId;

/// 12-hour clock with AM/PM marker, e.g. `3:04PM`.
pub const TIME_FORMAT: &str = "%-I:%M%p";

/// Non-owning reference to the peer a message originated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    /// Registry key of the originating peer.
    pub id: PeerId,
    /// Display name the peer connected with.
    pub name: Arc<str>,
}

/// A single relayed message. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Message {
    sender: Sender,
    timestamp: DateTime<Local>,
    content: String,
}

impl Message {
    /// Builds a message from raw inbound text, stamped with the current time.
    ///
    /// Embedded newlines become spaces and surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(sender: Sender, text: &str) -> Self {
        Self::at(sender, Local::now(), text)
    }

    /// Builds a message with an explicit timestamp.
    #[must_use]
    pub fn at(sender: Sender, timestamp: DateTime<Local>, text: &str) -> Self {
        Self {
            sender,
            timestamp,
            content: normalize(text),
        }
    }

    /// Originating peer.
    #[must_use]
    pub const fn sender(&self) -> &Sender {
        &self.sender
    }

    /// Capture time.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Normalized text content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Serializes the message into the single text frame delivered to peers.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] if serialization fails.
    pub fn encode(&self) -> Result<Arc<str>, serde_json::Error> {
        let wire = WireMessage::from(self);
        serde_json::to_string(&wire).map(Arc::from)
    }
}

/// JSON record sent to browsers: three display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireMessage {
    /// Sender display name.
    pub sender: String,
    /// Human-readable send time.
    pub time: String,
    /// Message body.
    pub content: String,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            sender: message.sender.name.to_string(),
            time: message.timestamp.format(TIME_FORMAT).to_string(),
            content: message.content.clone(),
        }
    }
}

fn normalize(text: &str) -> String {
    text.replace('\n', " ").trim().to_string()
}
