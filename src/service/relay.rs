//! Relay service: orchestrates peer lifecycle, fan-out, and liveness.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::Message;

use crate::domain::{ConnectionRegistry, ControlMessage, PeerEntry, PeerId, ServerMessage};

/// Orchestration layer for everything the relay does with a connection.
///
/// Stateless coordinator: owns a reference to [`ConnectionRegistry`] for
/// membership and fan-out, plus the presence flag. Every lifecycle
/// mutation follows the pattern: update registry, log with the resulting
/// count, broadcast the presence update when enabled.
#[derive(Debug, Clone)]
pub struct RelayService {
    registry: Arc<ConnectionRegistry>,
    presence_enabled: bool,
}

impl RelayService {
    /// Creates a new `RelayService`.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>, presence_enabled: bool) -> Self {
        Self {
            registry,
            presence_enabled,
        }
    }

    /// Returns a reference to the inner [`ConnectionRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Registers a freshly upgraded connection and announces the new
    /// membership count to every peer, the newcomer included.
    pub async fn register(&self, entry: Arc<PeerEntry>) {
        let peer_id = entry.peer_id();
        let count = self.registry.add(entry).await;
        tracing::info!(%peer_id, peers = count, "peer connected");
        self.broadcast_presence(count).await;
    }

    /// Removes a connection from the registry.
    ///
    /// Idempotent: the connection task's teardown and the liveness sweep
    /// may both call this, and only the first removal logs and announces.
    pub async fn unregister(&self, peer_id: PeerId) {
        if let Some(remaining) = self.registry.remove(peer_id).await {
            tracing::info!(%peer_id, peers = remaining, "peer disconnected");
            self.broadcast_presence(remaining).await;
        }
    }

    /// Fans one binary audio frame out to every peer except the sender.
    /// Returns the number of peers the frame was queued for.
    pub async fn relay_frame(&self, sender: PeerId, frame: Bytes) -> usize {
        let delivered = self.registry.broadcast_frame(sender, frame).await;
        tracing::trace!(%sender, recipients = delivered, "audio frame relayed");
        delivered
    }

    /// Applies a text control frame received from `peer_id`.
    ///
    /// Heartbeats and pongs refresh the sender's liveness flag; a ping
    /// additionally draws a pong reply to the sender alone. Anything
    /// unrecognized is logged and dropped without touching the connection.
    pub async fn handle_control(&self, peer_id: PeerId, text: &str) {
        match ControlMessage::parse(text) {
            ControlMessage::Heartbeat | ControlMessage::Pong => {
                self.registry.mark_alive(peer_id).await;
            }
            ControlMessage::Ping => {
                self.registry.mark_alive(peer_id).await;
                self.reply(peer_id, &ServerMessage::Pong).await;
            }
            ControlMessage::Unknown => {
                tracing::debug!(%peer_id, "ignoring unrecognized control payload");
            }
        }
    }

    /// Records transport-level liveness traffic (ping or pong frames)
    /// from `peer_id`.
    pub async fn observe_liveness(&self, peer_id: PeerId) {
        self.registry.mark_alive(peer_id).await;
    }

    /// Runs one liveness pass: peers silent for a full interval are
    /// closed and unregistered, everyone else gets a fresh transport
    /// ping. Returns the number of evicted peers.
    pub async fn sweep(&self) -> usize {
        let evicted = self.registry.sweep().await;
        let count = evicted.len();
        for entry in evicted {
            let peer_id = entry.peer_id();
            entry.close();
            tracing::info!(%peer_id, "evicting unresponsive peer");
            self.unregister(peer_id).await;
        }
        count
    }

    /// Current number of registered peers.
    pub async fn peer_count(&self) -> usize {
        self.registry.len().await
    }

    async fn broadcast_presence(&self, count: usize) {
        if !self.presence_enabled {
            return;
        }
        if let Some(message) = encode(&ServerMessage::Count { count }) {
            self.registry.broadcast_control(message).await;
        }
    }

    async fn reply(&self, peer_id: PeerId, message: &ServerMessage) {
        let Some(message) = encode(message) else {
            return;
        };
        if let Some(entry) = self.registry.get(peer_id).await
            && !entry.send(message)
        {
            tracing::debug!(%peer_id, "control reply dropped, outbound queue full");
        }
    }
}

fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Message::text(json)),
        Err(error) => {
            tracing::warn!(%error, "failed to serialize control message");
            None
        }
    }
}
