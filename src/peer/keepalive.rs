//! Keepalive timing shared by a peer's reader and writer.

use std::time::Duration;

/// Liveness and write-deadline parameters.
///
/// The writer pings every [`Keepalive::ping_period`], nine tenths of the
/// liveness window, so a ping lands before the remote's deadline expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keepalive {
    pong_wait: Duration,
    write_wait: Duration,
}

impl Keepalive {
    /// Creates keepalive settings from the liveness window and write deadline.
    #[must_use]
    pub const fn new(pong_wait: Duration, write_wait: Duration) -> Self {
        Self {
            pong_wait,
            write_wait,
        }
    }

    /// How long the reader waits for any inbound frame.
    #[must_use]
    pub const fn pong_wait(&self) -> Duration {
        self.pong_wait
    }

    /// Deadline applied to each individual write.
    #[must_use]
    pub const fn write_wait(&self) -> Duration {
        self.write_wait
    }

    /// Interval between pings.
    #[must_use]
    pub fn ping_period(&self) -> Duration {
        self.pong_wait * 9 / 10
    }
}

impl Default for Keepalive {
    fn default() -> Self {
        Self::new(Duration::from_secs(60), Duration::from_secs(10))
    }
}
