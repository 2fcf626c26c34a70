//! WebSocket layer: upgrade endpoint and per-connection loop.
//!
//! The relay exposes a single surface: a WebSocket handshake on any path
//! joins the one shared broadcast stream. There are no rooms and no REST
//! routes; plain HTTP requests fail the upgrade with a client error.

pub mod connection;
pub mod handler;

use axum::Router;

use crate::app_state::AppState;

/// Builds the relay router: one fallback route that upgrades every path.
pub fn build_router() -> Router<AppState> {
    Router::new().fallback(handler::relay_handler)
}
