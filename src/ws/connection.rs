//! WebSocket connection read/write loop.
//!
//! Each upgraded socket gets exactly one task running [`run_connection`].
//! Inbound frames are dispatched by wire kind: binary frames are audio to
//! relay, text frames are JSON control messages. Outbound traffic of
//! every sort (relayed audio, control replies, presence updates, sweep
//! pings) arrives on the peer's bounded queue and is written to the
//! socket from this task alone, so writes are never interleaved.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::app_state::AppState;
use crate::domain::PeerEntry;

/// Runs the read/write loop for a single WebSocket connection.
///
/// Registers the peer on entry and unregisters it on every exit path:
/// client close, transport error, or forced shutdown by the liveness
/// sweep.
pub async fn run_connection(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel(state.config.send_queue_capacity);
    let entry = Arc::new(PeerEntry::new(outbound_tx));
    let peer_id = entry.peer_id();

    state.relay.register(Arc::clone(&entry)).await;

    loop {
        tokio::select! {
            // Incoming frame from the client
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Binary(frame))) => {
                        state.relay.relay_frame(peer_id, frame).await;
                    }
                    Some(Ok(Message::Text(text))) => {
                        state.relay.handle_control(peer_id, text.as_str()).await;
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        // Axum answers transport pings itself; traffic in
                        // either direction proves the peer is live.
                        state.relay.observe_liveness(peer_id).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(error)) => {
                        tracing::debug!(%peer_id, %error, "ws transport error");
                        break;
                    }
                }
            }
            // Queued outbound traffic for this peer
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(message) => {
                        if !write_outbound(&mut ws_tx, &entry, message).await {
                            break;
                        }
                    }
                    None => break,
                }
            }
            // Forced shutdown, e.g. evicted by the liveness sweep
            () = entry.closed() => break,
        }
    }

    state.relay.unregister(peer_id).await;
    let connected_secs = (chrono::Utc::now() - entry.connected_at()).num_seconds();
    tracing::debug!(%peer_id, connected_secs, "ws connection closed");
}

/// Writes one queued message to the socket, abandoning the write if the
/// peer is closed first. A write to a stalled peer must not delay the
/// forced shutdown of its connection. Returns `false` when the
/// connection should end.
async fn write_outbound<S>(ws_tx: &mut S, entry: &PeerEntry, message: Message) -> bool
where
    S: Sink<Message> + Unpin,
{
    tokio::select! {
        result = ws_tx.send(message) => result.is_ok(),
        () = entry.closed() => false,
    }
}
