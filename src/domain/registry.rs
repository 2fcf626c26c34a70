//! Concurrent registry of live WebSocket peers.
//!
//! [`ConnectionRegistry`] owns the authoritative set of open connections.
//! Every mutation path (accept, per-connection teardown, liveness sweep)
//! goes through the same `RwLock`-guarded map, so membership changes are
//! serialized while fan-out runs under a shared read lock. None of the
//! per-peer operations await while a guard is held: sends use the bounded
//! queue's `try_send`, so a slow peer can stall neither the lock nor the
//! sender's read loop.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::RwLock;

use super::{PeerEntry, PeerId};

/// Registry of all connected peers, keyed by [`PeerId`].
#[derive(Debug)]
pub struct ConnectionRegistry {
    peers: RwLock<HashMap<PeerId, Arc<PeerEntry>>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a peer and returns the membership count afterwards.
    pub async fn add(&self, entry: Arc<PeerEntry>) -> usize {
        let mut peers = self.peers.write().await;
        peers.insert(entry.peer_id(), entry);
        peers.len()
    }

    /// Removes a peer, returning the remaining count if it was present.
    ///
    /// Removal is idempotent: the sweep and the connection task's own
    /// teardown may both try, and only the first caller observes `Some`.
    pub async fn remove(&self, peer_id: PeerId) -> Option<usize> {
        let mut peers = self.peers.write().await;
        peers.remove(&peer_id).map(|_| peers.len())
    }

    /// Looks up a peer by id.
    pub async fn get(&self, peer_id: PeerId) -> Option<Arc<PeerEntry>> {
        let peers = self.peers.read().await;
        peers.get(&peer_id).map(Arc::clone)
    }

    /// Sets the liveness flag for a peer. Returns `false` if the peer is
    /// no longer registered.
    pub async fn mark_alive(&self, peer_id: PeerId) -> bool {
        let peers = self.peers.read().await;
        match peers.get(&peer_id) {
            Some(entry) => {
                entry.mark_alive();
                true
            }
            None => false,
        }
    }

    /// Fans one binary audio frame out to every peer except the sender.
    ///
    /// Returns the number of peers the frame was queued for. A peer whose
    /// queue is full loses this frame and nothing else; a peer whose
    /// connection task is gone gets flagged for shutdown so its teardown
    /// path can unregister it.
    pub async fn broadcast_frame(&self, sender: PeerId, frame: Bytes) -> usize {
        let mut delivered = 0;
        let mut defunct = Vec::new();
        {
            let peers = self.peers.read().await;
            for (peer_id, entry) in peers.iter() {
                if *peer_id == sender {
                    continue;
                }
                if entry.send(Message::Binary(frame.clone())) {
                    delivered += 1;
                } else if entry.is_disconnected() {
                    defunct.push(Arc::clone(entry));
                } else {
                    tracing::debug!(%peer_id, "outbound queue full, audio frame dropped");
                }
            }
        }
        for entry in defunct {
            entry.close();
        }
        delivered
    }

    /// Sends a control message to every registered peer, the sender of any
    /// triggering event included. Returns the number of peers reached.
    pub async fn broadcast_control(&self, message: Message) -> usize {
        let peers = self.peers.read().await;
        let mut reached = 0;
        for entry in peers.values() {
            if entry.send(message.clone()) {
                reached += 1;
            }
        }
        reached
    }

    /// One liveness pass over every peer.
    ///
    /// Peers whose flag is still set have it cleared and a transport ping
    /// queued; answering the ping sets the flag again before the next
    /// pass. Peers whose flag was already clear stayed silent for a full
    /// interval and are returned for eviction.
    pub async fn sweep(&self) -> Vec<Arc<PeerEntry>> {
        let peers = self.peers.read().await;
        let mut evicted = Vec::new();
        for entry in peers.values() {
            if entry.take_alive() {
                entry.send(Message::Ping(Bytes::new()));
            } else {
                evicted.push(Arc::clone(entry));
            }
        }
        evicted
    }

    /// Number of registered peers.
    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Whether the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
