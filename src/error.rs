//! Relay error types.
//!
//! [`RelayError`] covers the relay's fatal startup failures. Runtime
//! faults on individual connections (transport errors, malformed control
//! payloads, full queues) are contained and logged where they occur and
//! never surface as typed errors, so the process outlives any single
//! misbehaving peer.

use std::net::SocketAddr;

/// Errors that can abort relay startup.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that could not be bound.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
