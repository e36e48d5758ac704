//! End-to-end tests: real router on an ephemeral port, driven by WebSocket
//! and HTTP clients.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use chat_relay::api;
use chat_relay::app_state::AppState;
use chat_relay::config::RelayConfig;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WELCOME: &str = "welcome to the room";

async fn spawn_server(config: RelayConfig) -> SocketAddr {
    let state = AppState::from_config(&config);
    let app = api::build_router(&config).with_state(state);

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
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

fn test_config() -> RelayConfig {
    RelayConfig {
        welcome_message: WELCOME.to_string(),
        default_display_name: "anonymous".to_string(),
        ..RelayConfig::default()
    }
}

async fn connect(addr: SocketAddr, path: &str) -> Client {
    let Ok((ws, _)) = tokio_tungstenite::connect_async(format!("ws://{addr}{path}")).await else {
        panic!("websocket connect failed");
    };
    ws
}

async fn next_json(ws: &mut Client) -> Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(5), ws.next()).await
        else {
            panic!("expected a frame");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str(text.as_str()) else {
                panic!("frame is not JSON: {text}");
            };
            return value;
        }
    }
}

async fn send_json(ws: &mut Client, value: Value) {
    if ws.send(Message::text(value.to_string())).await.is_err() {
        panic!("send failed");
    }
}

fn user_count(count: usize) -> Value {
    json!({ "type": "userCount", "count": count })
}

#[tokio::test]
async fn chat_session_scenario() {
    let addr = spawn_server(test_config()).await;

    let mut c1 = connect(addr, "/ws").await;
    assert_eq!(
        next_json(&mut c1).await,
        json!({ "type": "system", "message": WELCOME })
    );
    assert_eq!(next_json(&mut c1).await, user_count(1));

    let mut c2 = connect(addr, "/ws").await;
    assert_eq!(next_json(&mut c2).await["type"], "system");
    assert_eq!(next_json(&mut c2).await, user_count(2));
    assert_eq!(next_json(&mut c1).await, user_count(2));

    send_json(&mut c1, json!({ "type": "setUsername", "username": "Bob" })).await;
    assert_eq!(next_json(&mut c1).await, user_count(2));
    assert_eq!(next_json(&mut c2).await, user_count(2));

    send_json(&mut c1, json!({ "type": "message", "message": "hello" })).await;
    let m1 = next_json(&mut c1).await;
    let m2 = next_json(&mut c2).await;
    assert_eq!(m1, m2);
    assert_eq!(m1["type"], "message");
    assert_eq!(m1["username"], "Bob");
    assert_eq!(m1["message"], "hello");
    assert!(m1["timestamp"].as_i64().is_some_and(|ts| ts > 0));

    if c2.close(None).await.is_err() {
        panic!("close failed");
    }
    assert_eq!(next_json(&mut c1).await, user_count(1));
}

#[tokio::test]
async fn typing_is_not_echoed_to_sender() {
    let addr = spawn_server(test_config()).await;

    let mut a = connect(addr, "/ws").await;
    next_json(&mut a).await;
    next_json(&mut a).await;
    let mut b = connect(addr, "/ws").await;
    next_json(&mut b).await;
    next_json(&mut b).await;
    assert_eq!(next_json(&mut a).await, user_count(2));

    send_json(&mut a, json!({ "type": "typing", "isTyping": true })).await;
    assert_eq!(
        next_json(&mut b).await,
        json!({ "type": "typing", "username": "anonymous", "isTyping": true })
    );

    // The next frame `a` sees must be its own chat message, not the typing notice.
    send_json(&mut a, json!({ "type": "message", "message": "done" })).await;
    let echoed = next_json(&mut a).await;
    assert_eq!(echoed["type"], "message");
    assert_eq!(echoed["message"], "done");
}

#[tokio::test]
async fn garbage_frames_keep_connection_open() {
    let addr = spawn_server(test_config()).await;

    let mut ws = connect(addr, "/").await;
    next_json(&mut ws).await;
    next_json(&mut ws).await;

    if ws.send(Message::text("{oops".to_string())).await.is_err() {
        panic!("send failed");
    }
    send_json(&mut ws, json!({ "type": "dance" })).await;
    send_json(&mut ws, json!({ "type": "message", "message": "still here" })).await;

    let frame = next_json(&mut ws).await;
    assert_eq!(frame["message"], "still here");
    assert_eq!(frame["username"], "anonymous");
}

#[tokio::test]
async fn binary_frames_are_read_as_text_when_utf8() {
    let addr = spawn_server(test_config()).await;

    let mut sender = connect(addr, "/ws").await;
    next_json(&mut sender).await;
    next_json(&mut sender).await;
    let mut listener = connect(addr, "/ws").await;
    next_json(&mut listener).await;
    next_json(&mut listener).await;
    assert_eq!(next_json(&mut sender).await, user_count(2));

    let invalid_utf8 = vec![0xff, 0xfe, 0xfd];
    if sender.send(Message::binary(invalid_utf8)).await.is_err() {
        panic!("send failed");
    }

    let chat = json!({ "type": "message", "message": "from bytes" }).to_string();
    if sender.send(Message::binary(chat.into_bytes())).await.is_err() {
        panic!("send failed");
    }

    for ws in [&mut sender, &mut listener] {
        let frame = next_json(ws).await;
        assert_eq!(frame["type"], "message");
        assert_eq!(frame["message"], "from bytes");
        assert_eq!(frame["username"], "anonymous");
    }

    // The non-UTF-8 frame did not end the session.
    let Ok(response) = reqwest::get(format!("http://{addr}/health")).await else {
        panic!("health request failed");
    };
    let Ok(body) = response.json::<Value>().await else {
        panic!("health body is not JSON");
    };
    assert_eq!(body["connections"], 2);
}

#[tokio::test]
async fn client_close_is_acknowledged() {
    let addr = spawn_server(test_config()).await;

    let mut ws = connect(addr, "/ws").await;
    next_json(&mut ws).await;
    next_json(&mut ws).await;

    if ws.close(None).await.is_err() {
        panic!("close failed");
    }
    loop {
        match tokio::time::timeout(Duration::from_secs(5), ws.next()).await {
            Ok(Some(Ok(Message::Close(_))) | None) => break,
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(err))) => panic!("close handshake failed: {err}"),
            Err(_) => panic!("server never finished the close handshake"),
        }
    }
}

#[tokio::test]
async fn health_reports_connection_count() {
    let addr = spawn_server(test_config()).await;

    let mut ws = connect(addr, "/ws").await;
    next_json(&mut ws).await;
    next_json(&mut ws).await;

    let Ok(response) = reqwest::get(format!("http://{addr}/health")).await else {
        panic!("health request failed");
    };
    assert!(response.status().is_success());
    let Ok(body) = response.json::<Value>().await else {
        panic!("health body is not JSON");
    };
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["connections"], 1);
}

#[tokio::test]
async fn serves_index_and_static_assets() {
    let dir: PathBuf = std::env::temp_dir().join(format!("chat-relay-{}", uuid::Uuid::new_v4()));
    let public = dir.join("public");
    if std::fs::create_dir_all(&public).is_err() {
        panic!("cannot create temp dir");
    }
    let index = dir.join("index.html");
    if std::fs::write(&index, "<h1>room</h1>").is_err()
        || std::fs::write(public.join("app.js"), "console.log(1);").is_err()
    {
        panic!("cannot write fixtures");
    }

    let addr = spawn_server(RelayConfig {
        static_dir: public,
        index_file: index,
        ..test_config()
    })
    .await;

    let Ok(page) = reqwest::get(format!("http://{addr}/")).await else {
        panic!("index request failed");
    };
    assert!(page.status().is_success());
    assert_eq!(page.text().await.unwrap_or_default(), "<h1>room</h1>");

    let Ok(asset) = reqwest::get(format!("http://{addr}/app.js")).await else {
        panic!("asset request failed");
    };
    assert!(asset.status().is_success());
    assert_eq!(asset.text().await.unwrap_or_default(), "console.log(1);");

    let _ = std::fs::remove_dir_all(&dir);
}
