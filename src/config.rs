//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`), with defaults chosen so the relay
//! runs with no configuration at all.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::RelayError;

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Seconds between liveness sweeps over the registry.
    pub sweep_interval_secs: u64,

    /// Whether membership changes broadcast a `count` message to all
    /// peers.
    pub presence_enabled: bool,

    /// Capacity of each peer's outbound queue. A full queue drops
    /// individual frames, never the connection.
    pub send_queue_capacity: usize,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set or
    /// does not validate. The sweep interval and queue capacity must be
    /// positive; a value of `0` falls back to the default like any other
    /// invalid value. Calls `dotenvy::dotenv().ok()` to optionally load
    /// a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if `LISTEN_ADDR` is set but cannot
    /// be parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();

        let raw_addr =
            std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let listen_addr: SocketAddr = raw_addr
            .parse()
            .map_err(|_| RelayError::Config(format!("invalid LISTEN_ADDR: {raw_addr}")))?;

        Ok(Self {
            listen_addr,
            sweep_interval_secs: parse_env_positive("SWEEP_INTERVAL_SECS", 30),
            presence_enabled: parse_env_bool("PRESENCE_ENABLED", true),
            send_queue_capacity: parse_env_positive("SEND_QUEUE_CAPACITY", 256),
        })
    }

    /// The sweep interval as a [`Duration`].
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Parses an environment variable as a positive integer, returning
/// `default` on missing, invalid, or zero values.
fn parse_env_positive<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + From<u8>,
{
    std::env::var(key)
        .ok()
        .and_then(|raw| parse_positive(&raw))
        .unwrap_or(default)
}

/// Parses a positive integer from `raw`. Zero yields `None`: a zero
/// sweep period or queue capacity cannot run.
fn parse_positive<T>(raw: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + From<u8>,
{
    raw.parse().ok().filter(|value| *value > T::from(0u8))
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref() {
        Some("true") | Some("TRUE") | Some("1") => true,
        Some("false") | Some("FALSE") | Some("0") => false,
        _ => default,
    }
}
