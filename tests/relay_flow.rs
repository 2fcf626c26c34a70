//! End-to-end relay behavior over real sockets.
//!
//! Each test boots the full router on an ephemeral port and drives it
//! with `tokio-tungstenite` clients, the same way a browser peer would.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_test::assert_ok;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use wavecast_relay::app_state::AppState;
use wavecast_relay::config::RelayConfig;
use wavecast_relay::domain::ConnectionRegistry;
use wavecast_relay::liveness::spawn_sweeper;
use wavecast_relay::service::RelayService;
use wavecast_relay::ws;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const QUIET_WINDOW: Duration = Duration::from_millis(300);

/// Boots the relay on an ephemeral port and returns its address plus the
/// service handle for registry assertions.
async fn start_relay(
    presence_enabled: bool,
    sweep_interval_secs: u64,
) -> (SocketAddr, Arc<RelayService>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = RelayConfig {
        listen_addr: addr,
        sweep_interval_secs,
        presence_enabled,
        send_queue_capacity: 64,
    };
    let relay = Arc::new(RelayService::new(
        Arc::new(ConnectionRegistry::new()),
        config.presence_enabled,
    ));
    let _ = spawn_sweeper(Arc::clone(&relay), config.sweep_interval());

    let app_state = AppState {
        relay: Arc::clone(&relay),
        config: Arc::new(config),
    };
    let app = ws::build_router().with_state(app_state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, relay)
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (client, _response) = assert_ok!(connect_async(format!("ws://{addr}/")).await);
    client
}

/// Registration happens on the server after the client handshake returns,
/// so tests poll the registry until it settles.
async fn wait_for_peers(relay: &RelayService, expected: usize) {
    tokio::time::timeout(RECV_TIMEOUT, async {
        while relay.peer_count().await != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("peer count never settled");
}

/// Encodes `samples` the way a browser capture pipeline would: raw
/// little-endian 32-bit float PCM.
fn pcm_frame(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Receives frames until a binary one arrives, skipping control traffic.
async fn next_binary(client: &mut WsClient) -> Vec<u8> {
    loop {
        let message = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for a binary frame")
            .expect("connection closed while waiting for a binary frame")
            .expect("ws transport error");
        if let Message::Binary(payload) = message {
            return payload.to_vec();
        }
    }
}

/// Receives text frames until a `count` message arrives.
async fn next_count(client: &mut WsClient) -> u64 {
    loop {
        let message = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for a count message")
            .expect("connection closed while waiting for a count message")
            .expect("ws transport error");
        if let Message::Text(text) = message {
            let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
            if value["type"] == "count" {
                return value["count"].as_u64().unwrap();
            }
        }
    }
}

/// Receives text frames until one parses as JSON, returning the value.
async fn next_json(client: &mut WsClient) -> serde_json::Value {
    loop {
        let message = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for a text frame")
            .expect("connection closed while waiting for a text frame")
            .expect("ws transport error");
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Asserts that no frame of any kind reaches `client` within the quiet
/// window.
async fn assert_silent(client: &mut WsClient) {
    let outcome = tokio::time::timeout(QUIET_WINDOW, client.next()).await;
    assert!(outcome.is_err(), "expected no traffic, got {outcome:?}");
}

#[tokio::test]
async fn relay_fans_frames_out_to_all_other_peers() {
    let (addr, relay) = start_relay(false, 600).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    let mut c = connect(addr).await;
    wait_for_peers(&relay, 3).await;

    let frame = pcm_frame(&[0.0, 0.25, -0.5, 1.0]);
    a.send(Message::binary(frame.clone())).await.unwrap();

    assert_eq!(next_binary(&mut b).await, frame);
    assert_eq!(next_binary(&mut c).await, frame);
    // The sender never hears its own audio.
    assert_silent(&mut a).await;

    // One peer leaves; the remaining pair keeps exchanging audio.
    b.close(None).await.unwrap();
    wait_for_peers(&relay, 2).await;

    let frame = pcm_frame(&[0.5, -0.25]);
    a.send(Message::binary(frame.clone())).await.unwrap();
    assert_eq!(next_binary(&mut c).await, frame);
    assert_silent(&mut a).await;
}

#[tokio::test]
async fn frames_arrive_in_send_order() {
    let (addr, relay) = start_relay(false, 600).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_peers(&relay, 2).await;

    let frames: Vec<Vec<u8>> = (0..8u8)
        .map(|i| pcm_frame(&[f32::from(i), 0.5]))
        .collect();
    for frame in &frames {
        a.send(Message::binary(frame.clone())).await.unwrap();
    }

    for frame in &frames {
        assert_eq!(&next_binary(&mut b).await, frame);
    }
}

#[tokio::test]
async fn json_ping_draws_a_pong_to_the_sender_only() {
    let (addr, relay) = start_relay(false, 600).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_peers(&relay, 2).await;

    a.send(Message::text(r#"{"type":"ping"}"#)).await.unwrap();

    let reply = next_json(&mut a).await;
    assert_eq!(reply["type"], "pong");
    assert_silent(&mut b).await;
}

#[tokio::test]
async fn heartbeat_draws_no_reply_and_keeps_the_stream_open() {
    let (addr, relay) = start_relay(false, 600).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_peers(&relay, 2).await;

    a.send(Message::text(r#"{"type":"heartbeat"}"#))
        .await
        .unwrap();
    assert_silent(&mut a).await;
    assert_silent(&mut b).await;

    // The connection is untouched: audio still flows afterwards.
    let frame = pcm_frame(&[0.125; 4]);
    a.send(Message::binary(frame.clone())).await.unwrap();
    assert_eq!(next_binary(&mut b).await, frame);
}

#[tokio::test]
async fn malformed_and_unknown_control_frames_are_ignored() {
    let (addr, relay) = start_relay(false, 600).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_peers(&relay, 2).await;

    a.send(Message::text("this is not json")).await.unwrap();
    a.send(Message::text(r#"{"type":"subscribe"}"#))
        .await
        .unwrap();
    a.send(Message::text("{}")).await.unwrap();

    assert_silent(&mut a).await;
    assert_silent(&mut b).await;
    assert_eq!(relay.peer_count().await, 2);

    let frame = pcm_frame(&[1.0, -1.0]);
    a.send(Message::binary(frame.clone())).await.unwrap();
    assert_eq!(next_binary(&mut b).await, frame);
}

#[tokio::test]
async fn presence_counts_track_joins_and_departures() {
    let (addr, relay) = start_relay(true, 600).await;

    let mut a = connect(addr).await;
    assert_eq!(next_count(&mut a).await, 1);

    let mut b = connect(addr).await;
    assert_eq!(next_count(&mut b).await, 2);
    assert_eq!(next_count(&mut a).await, 2);

    b.close(None).await.unwrap();
    assert_eq!(next_count(&mut a).await, 1);
    wait_for_peers(&relay, 1).await;
}

#[tokio::test]
async fn silent_peer_is_evicted_while_a_responsive_one_survives() {
    let (addr, relay) = start_relay(false, 1).await;
    let responsive = connect(addr).await;
    let lagging = connect(addr).await;
    wait_for_peers(&relay, 2).await;

    // Polling the stream lets tungstenite answer the relay's pings; the
    // lagging client is never polled and so never pongs.
    let reader = tokio::spawn(async move {
        let mut client = responsive;
        while let Some(Ok(_)) = client.next().await {}
    });

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(relay.peer_count().await, 1);

    reader.abort();
    drop(lagging);
}

#[tokio::test]
async fn non_upgrade_requests_are_rejected_with_a_client_error() {
    let (addr, _relay) = start_relay(false, 600).await;

    let response = assert_ok!(reqwest::get(format!("http://{addr}/")).await);
    assert!(response.status().is_client_error());

    let client = reqwest::Client::new();
    let response = assert_ok!(
        client
            .post(format!("http://{addr}/stream"))
            .body("pcm")
            .send()
            .await
    );
    assert!(response.status().is_client_error());
}
