//! WebSocket upgrade handler.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{FromRequestParts, Request, WebSocketUpgrade};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use filehost_plugin::OutboundFrame;
use filehost_realtime::{ConnectionManager, InboundFrame, ValidatedUpgrade, WsSession, validate_upgrade};

use crate::extractors::Caller;
use crate::state::AppState;

/// Returns true if the request asks for a WebSocket upgrade.
pub fn is_upgrade_request(headers: &HeaderMap) -> bool {
    let connection_upgrade = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|token| token.trim().eq_ignore_ascii_case("upgrade"));
    let upgrade_websocket = headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("websocket"));
    connection_upgrade && upgrade_websocket
}

/// Validates and performs an upgrade on any resource path.
///
/// A refused upgrade gets no HTTP response at all: the connection is torn
/// down and the reason is only logged.
pub async fn upgrade(state: AppState, caller: Caller, request: Request) -> Response {
    let path = request.uri().path().to_string();

    let upgrade = match validate_upgrade(&state.resources, &caller.policy, &caller.ctx, &path).await
    {
        Ok(upgrade) => upgrade,
        Err(rejection) => {
            warn!(ip = %caller.ip, path = %path, reason = %rejection, "WebSocket upgrade rejected");
            return reject();
        }
    };

    let (mut parts, _body) = request.into_parts();
    let ws = match WebSocketUpgrade::from_request_parts(&mut parts, &state).await {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!(ip = %caller.ip, path = %path, error = %rejection.body_text(), "WebSocket handshake failed");
            return rejection.into_response();
        }
    };

    let manager = state.realtime.clone();
    let ip = caller.ctx.ip.clone();
    let cookies = caller.ctx.cookies.clone();
    ws.on_upgrade(move |socket| handle_ws_connection(manager, upgrade, ip, cookies, socket))
}

/// A response the server can never deliver.
///
/// The body fails on its first poll, so the connection is aborted before
/// the status line reaches the client.
fn reject() -> Response {
    let body = Body::from_stream(futures::stream::once(async {
        Err::<Bytes, _>(std::io::Error::new(
            std::io::ErrorKind::ConnectionAborted,
            "WebSocket upgrade rejected",
        ))
    }));
    (StatusCode::BAD_REQUEST, [(header::CONNECTION, "close")], body).into_response()
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(
    manager: Arc<ConnectionManager>,
    upgrade: ValidatedUpgrade,
    ip: String,
    cookies: HashMap<String, String>,
    socket: WebSocket,
) {
    let (session, mut outbound_rx) = WsSession::upgraded(manager, upgrade, ip, cookies);
    let conn_id = session.connection().id;
    let (mut ws_tx, ws_rx) = socket.split();

    info!(
        conn_id = %conn_id,
        ip = %session.connection().ip,
        path = %session.connection().path,
        "WebSocket connection established"
    );

    // Spawn outbound message forwarder
    let outbound_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            let message = match frame {
                OutboundFrame::Text(text) => Message::Text(text.into()),
                OutboundFrame::Close => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            };
            if ws_tx.send(message).await.is_err() {
                break;
            }
        }
    });

    let inbound = ws_rx.filter_map(move |result| async move {
        match result {
            Ok(Message::Text(text)) => Some(InboundFrame::Text(text.as_str().to_owned())),
            Ok(Message::Binary(data)) => Some(InboundFrame::Binary(data)),
            Ok(Message::Close(_)) => Some(InboundFrame::Close),
            // Ping is handled by axum automatically
            Ok(_) => None,
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "WebSocket error");
                Some(InboundFrame::Close)
            }
        }
    });

    let state = session.run(Box::pin(inbound)).await;
    outbound_task.abort();

    info!(conn_id = %conn_id, state = %state, "WebSocket connection closed");
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_is_upgrade_request() {
        let mut headers = HeaderMap::new();
        assert!(!is_upgrade_request(&headers));

        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, Upgrade"));
        headers.insert(header::UPGRADE, HeaderValue::from_static("WebSocket"));
        assert!(is_upgrade_request(&headers));

        headers.insert(header::UPGRADE, HeaderValue::from_static("h2c"));
        assert!(!is_upgrade_request(&headers));
    }

    #[tokio::test]
    async fn test_rejection_body_aborts() {
        let response = reject();
        assert_eq!(response.headers()[header::CONNECTION], "close");
        assert!(axum::body::to_bytes(response.into_body(), usize::MAX).await.is_err());
    }
}
