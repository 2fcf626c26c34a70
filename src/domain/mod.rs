//! Domain layer: peer identity, connection registry, and the control
//! vocabulary.
//!
//! This module contains the server-side domain model: type-safe peer
//! identifiers, per-connection entries with liveness state, the JSON
//! control messages exchanged as text frames, and the registry that fans
//! audio frames out across connections.

pub mod control;
pub mod peer;
pub mod peer_id;
pub mod registry;

pub use control::{ControlMessage, ServerMessage};
pub use peer::PeerEntry;
pub use peer_id::PeerId;
pub use registry::ConnectionRegistry;
