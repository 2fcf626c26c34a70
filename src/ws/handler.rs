//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// Upgrades an HTTP request to a WebSocket relay connection.
///
/// Mounted as the router fallback, so a handshake on any path reaches the
/// same broadcast stream. Requests that are not WebSocket upgrades are
/// rejected by the extractor with a client-error status before this body
/// runs.
pub async fn relay_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_connection(socket, state))
}
