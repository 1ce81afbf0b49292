//! Opaque peer identifier.
//!
//! Registry membership is keyed on [`PeerId`], never on the connection
//! object or the display name.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registry key of a connected peer, minted once per connection.
///
/// Display names may repeat; ids do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(Uuid);

impl PeerId {
    /// Mints a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}
