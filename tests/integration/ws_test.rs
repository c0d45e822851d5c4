//! Integration tests for WebSocket sessions over a live server.

mod helpers;

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr, path: &str) -> Client {
    let (ws, _) = connect_async(format!("ws://{addr}{path}"))
        .await
        .expect("Failed to connect");
    ws
}

async fn next_json(ws: &mut Client) -> serde_json::Value {
    let msg = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return text.to_string(),
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("Unexpected frame: {other:?}"),
            }
        }
    })
    .await
    .expect("Timed out waiting for a message");
    serde_json::from_str(&msg).expect("Message is not JSON")
}

async fn wait_for_connections(app: &helpers::TestApp, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while app.realtime.connection_count() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Connection count never settled");
}

#[tokio::test]
async fn test_echo() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn().await;
    let mut ws = connect(addr, "/all/echo.js").await;

    ws.send(Message::text(r#"{"hello":"world"}"#)).await.unwrap();

    assert_eq!(next_json(&mut ws).await, serde_json::json!({"hello": "world"}));
}

#[tokio::test]
async fn test_malformed_message_arrives_empty() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn().await;
    let mut ws = connect(addr, "/all/echo.js").await;

    ws.send(Message::text("not json")).await.unwrap();

    assert_eq!(next_json(&mut ws).await, serde_json::json!({}));
}

#[tokio::test]
async fn test_chat_relays_between_members() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn().await;

    let mut alice = connect(addr, "/all/chat.js").await;
    let joined = next_json(&mut alice).await;
    assert_eq!(joined["type"], "join");
    assert_eq!(joined["members"], 1);

    let mut bob = connect(addr, "/all/chat.js").await;
    assert_eq!(next_json(&mut alice).await["members"], 2);
    assert_eq!(next_json(&mut bob).await["members"], 2);

    alice.send(Message::text(r#"{"say":"hi"}"#)).await.unwrap();
    for ws in [&mut alice, &mut bob] {
        let event = next_json(ws).await;
        assert_eq!(event["type"], "message");
        assert_eq!(event["ip"], "127.0.0.1");
        assert_eq!(event["message"]["say"], "hi");
    }

    bob.close(None).await.unwrap();
    let left = next_json(&mut alice).await;
    assert_eq!(left["type"], "leave");
    assert_eq!(left["members"], 1);
}

#[tokio::test]
async fn test_closed_session_unregisters() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn().await;

    let mut ws = connect(addr, "/all/echo.js").await;
    wait_for_connections(&app, 1).await;

    ws.close(None).await.unwrap();
    wait_for_connections(&app, 0).await;
}

#[tokio::test]
async fn test_server_close_all_ends_sessions() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn().await;

    let mut ws = connect(addr, "/all/echo.js").await;
    wait_for_connections(&app, 1).await;

    assert_eq!(app.realtime.close_all(), 1);

    let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("Timed out waiting for close");
    assert!(matches!(frame, Some(Ok(Message::Close(_))) | None));
    wait_for_connections(&app, 0).await;
}

#[tokio::test]
async fn test_upgrade_rejections() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn().await;

    for path in ["/private/doc.txt", "/all/pub.txt", "/all/missing.js", "/all/%2e%2e/x"] {
        match connect_async(format!("ws://{addr}{path}")).await {
            Ok(_) => panic!("Upgrade to {path} was accepted"),
            Err(WsError::Http(response)) => {
                panic!("Rejection of {path} sent HTTP {}", response.status())
            }
            Err(_) => {}
        }
    }
    assert_eq!(app.realtime.connection_count(), 0);
}
