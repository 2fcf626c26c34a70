//! # wavecast-relay
//!
//! WebSocket relay server that broadcasts raw PCM audio between browser
//! peers.
//!
//! Every connected peer shares one stream: binary frames a peer sends are
//! forwarded verbatim to every other peer, text frames carry a small JSON
//! control vocabulary (heartbeat, ping, pong), and a periodic sweep
//! evicts peers that stop answering pings. The relay never inspects or
//! transcodes audio payloads; it is a coordination layer only.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket)
//!     │
//!     ├── Upgrade handler + connection loop (ws/)
//!     │
//!     ├── RelayService (service/)
//!     │
//!     ├── ConnectionRegistry (domain/)
//!     └── Liveness sweep (liveness)
//! ```

pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod liveness;
pub mod service;
pub mod ws;
