//! Relay configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`). Missing or unparsable values fall back to defaults, except
//! `LISTEN_ADDR` which must parse when set.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::RelayError;
use crate::peer::Keepalive;

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Directory holding the prebuilt web front-end.
    pub static_dir: PathBuf,

    /// Liveness window: a peer must produce a frame within this many seconds.
    pub pong_wait_secs: u64,

    /// Deadline in seconds for every individual write.
    pub write_wait_secs: u64,

    /// Capacity of each peer's outbound queue.
    pub outbound_queue_capacity: usize,

    /// Capacity of the coordinator's request channel.
    pub hub_queue_capacity: usize,

    /// Largest inbound WebSocket message accepted, in bytes.
    pub max_message_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            static_dir: PathBuf::from("./my-app/build"),
            pong_wait_secs: 60,
            write_wait_secs: 10,
            outbound_queue_capacity: crate::peer::OUTBOUND_QUEUE_CAPACITY,
            hub_queue_capacity: 1,
            max_message_bytes: 64 * 1024,
        }
    }
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if `LISTEN_ADDR` is set but cannot be
    /// parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| RelayError::Config(format!("LISTEN_ADDR {raw:?}: {e}")))?,
            Err(_) => defaults.listen_addr,
        };

        let static_dir = std::env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        Ok(Self {
            listen_addr,
            static_dir,
            pong_wait_secs: parse_env_nonzero("PONG_WAIT_SECS", defaults.pong_wait_secs),
            write_wait_secs: parse_env_nonzero("WRITE_WAIT_SECS", defaults.write_wait_secs),
            outbound_queue_capacity: parse_env_nonzero(
                "OUTBOUND_QUEUE_CAPACITY",
                defaults.outbound_queue_capacity,
            ),
            hub_queue_capacity: parse_env_nonzero(
                "HUB_QUEUE_CAPACITY",
                defaults.hub_queue_capacity,
            ),
            max_message_bytes: parse_env_nonzero("MAX_MESSAGE_BYTES", defaults.max_message_bytes),
        })
    }

    /// Keepalive timings derived from this configuration.
    #[must_use]
    pub fn keepalive(&self) -> Keepalive {
        Keepalive::new(
            Duration::from_secs(self.pong_wait_secs),
            Duration::from_secs(self.write_wait_secs),
        )
    }
}

/// Parses an environment variable as `T`, returning `default` on missing,
/// invalid or zero values.
fn parse_env_nonzero<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + PartialEq + Default,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|v: &T| *v != T::default())
        .unwrap_or(default)
}
