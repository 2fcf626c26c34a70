//! Registry entry for a single live WebSocket peer.
//!
//! A [`PeerEntry`] bundles everything the relay needs to reach and manage
//! one connection: the bounded outbound queue drained by the connection
//! task, the liveness flag driven by the sweep, and the cancellation token
//! used to force the connection down.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::ws::Message;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::PeerId;

/// Shared handle to one connected peer.
///
/// Cloned handles are held by the registry and by the connection task;
/// every field mutation goes through `&self` methods, so entries are
/// freely shareable behind an `Arc`.
#[derive(Debug)]
pub struct PeerEntry {
    peer_id: PeerId,
    connected_at: DateTime<Utc>,
    outbound: mpsc::Sender<Message>,
    alive: AtomicBool,
    cancel: CancellationToken,
}

impl PeerEntry {
    /// Creates an entry around the outbound queue of a freshly upgraded
    /// connection. New entries start live.
    #[must_use]
    pub fn new(outbound: mpsc::Sender<Message>) -> Self {
        Self {
            peer_id: PeerId::new(),
            connected_at: Utc::now(),
            outbound,
            alive: AtomicBool::new(true),
            cancel: CancellationToken::new(),
        }
    }

    /// This peer's identifier.
    #[must_use]
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// When the connection was registered.
    #[must_use]
    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Queues an outbound message for this peer without blocking.
    ///
    /// Returns `false` when the message could not be queued, either
    /// because the queue is full (the frame is dropped, never the
    /// connection) or because the connection task is gone.
    pub fn send(&self, message: Message) -> bool {
        self.outbound.try_send(message).is_ok()
    }

    /// Whether the connection task has dropped its end of the queue.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.outbound.is_closed()
    }

    /// Marks the peer live until the next sweep clears the flag.
    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::Relaxed);
    }

    /// Clears the liveness flag, returning the value it held.
    ///
    /// The sweep calls this once per pass: `true` means the peer proved
    /// itself since the previous pass, `false` means it stayed silent for
    /// a full interval.
    pub fn take_alive(&self) -> bool {
        self.alive.swap(false, Ordering::Relaxed)
    }

    /// Current liveness flag.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Signals the connection task to shut the socket down.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Completes once [`close`](Self::close) has been called.
    pub async fn closed(&self) {
        self.cancel.cancelled().await;
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
