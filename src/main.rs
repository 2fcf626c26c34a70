//! wavecast-relay server entry point.
//!
//! Starts the Axum server whose sole surface is the WebSocket upgrade.

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use wavecast_relay::app_state::AppState;
use wavecast_relay::config::RelayConfig;
use wavecast_relay::domain::ConnectionRegistry;
use wavecast_relay::error::RelayError;
use wavecast_relay::liveness::spawn_sweeper;
use wavecast_relay::service::RelayService;
use wavecast_relay::ws;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = RelayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting wavecast-relay");

    // Build domain and service layers
    let registry = Arc::new(ConnectionRegistry::new());
    let relay = Arc::new(RelayService::new(registry, config.presence_enabled));

    // Background liveness sweep
    let _sweeper = spawn_sweeper(Arc::clone(&relay), config.sweep_interval());

    // Build application state
    let app_state = AppState {
        relay,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = ws::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .map_err(|source| RelayError::Bind {
            addr: config.listen_addr,
            source,
        })?;
    tracing::info!(addr = %config.listen_addr, "relay listening");

    axum::serve(listener, app).await?;

    Ok(())
}
