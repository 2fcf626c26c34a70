//! JSON control vocabulary carried in WebSocket text frames.
//!
//! Binary frames are opaque audio and never parsed; text frames carry the
//! small tagged shapes below. Parsing never fails: any payload that is not
//! a recognized control shape maps to [`ControlMessage::Unknown`] and is
//! ignored by the relay.

use serde::{Deserialize, Serialize};

/// Control message sent by a client.
///
/// Wire form is a JSON object tagged by `type`, e.g. `{"type":"ping"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Client-initiated liveness signal; refreshes the sender's flag and
    /// draws no reply.
    Heartbeat,
    /// Application-level ping; answered with [`ServerMessage::Pong`].
    Ping,
    /// Application-level pong answering a relay ping; refreshes liveness.
    Pong,
    /// Catch-all for unrecognized or malformed payloads.
    #[serde(other)]
    Unknown,
}

impl ControlMessage {
    /// Parses a text payload into a control message.
    ///
    /// Malformed JSON, a missing tag, or an unrecognized tag all yield
    /// [`ControlMessage::Unknown`] rather than an error, so a misbehaving
    /// client can never tear down its own connection this way.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or(Self::Unknown)
    }
}

/// Control message sent by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Answer to a client [`ControlMessage::Ping`].
    Pong,
    /// Presence update broadcast to every peer when membership changes.
    Count {
        /// Number of peers currently connected.
        count: usize,
    },
}
