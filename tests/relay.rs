//! End-to-end relay tests over real WebSocket connections.

#![allow(clippy::panic, missing_docs)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use relay_hub::api;
use relay_hub::app_state::AppState;
use relay_hub::config::RelayConfig;
use relay_hub::domain::WireMessage;
use relay_hub::hub::Hub;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> SocketAddr {
    let config = RelayConfig::default();
    let state = AppState::new(Hub::spawn(config.hub_queue_capacity), &config);
    let app = api::build_app(state, &config.static_dir);

    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn connect(addr: SocketAddr, name: &str) -> Client {
    let url = format!("ws://{addr}/api/connect?name={name}");
    let Ok((ws, _)) = tokio_tungstenite::connect_async(url).await else {
        panic!("websocket connect failed");
    };
    ws
}

async fn peer_count(addr: SocketAddr) -> u64 {
    let Ok(response) = reqwest::get(format!("http://{addr}/health")).await else {
        panic!("health request failed");
    };
    let Ok(body) = response.json::<serde_json::Value>().await else {
        panic!("health body not json");
    };
    body["peers"].as_u64().unwrap_or_default()
}

async fn wait_for_peers(addr: SocketAddr, expected: u64) {
    for _ in 0..100 {
        if peer_count(addr).await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("peer count never reached {expected}");
}

async fn next_message(ws: &mut Client) -> WireMessage {
    loop {
        let next = tokio::time::timeout(Duration::from_secs(5), ws.next()).await;
        match next {
            Ok(Some(Ok(Message::Text(text)))) => {
                let Ok(wire) = serde_json::from_str(text.as_str()) else {
                    panic!("bad payload {}", text.as_str());
                };
                return wire;
            }
            Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => {}
            other => panic!("expected a text frame, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn message_is_relayed_to_every_connected_client() {
    let addr = start_server().await;
    let mut a = connect(addr, "client0").await;
    let mut b = connect(addr, "client1").await;
    wait_for_peers(addr, 2).await;

    let Ok(()) = a.send(Message::text("test message")).await else {
        panic!("send failed");
    };

    for ws in [&mut a, &mut b] {
        let wire = next_message(ws).await;
        assert_eq!(wire.sender, "client0");
        assert_eq!(wire.content, "test message");
        assert!(!wire.time.is_empty());
    }
}

#[tokio::test]
async fn messages_arrive_in_send_order() {
    let addr = start_server().await;
    let mut a = connect(addr, "A").await;
    let mut b = connect(addr, "B").await;
    wait_for_peers(addr, 2).await;

    for i in 0..10 {
        let Ok(()) = a.send(Message::text(format!("m{i}\n"))).await else {
            panic!("send failed");
        };
    }
    for i in 0..10 {
        assert_eq!(next_message(&mut b).await.content, format!("m{i}"));
    }
}

#[tokio::test]
async fn closing_client_leaves_the_roster() {
    let addr = start_server().await;
    let mut a = connect(addr, "A").await;
    let _b = connect(addr, "B").await;
    wait_for_peers(addr, 2).await;

    let Ok(()) = a.close(None).await else {
        panic!("close failed");
    };
    wait_for_peers(addr, 1).await;
}
