//! Connection manager: handles connection lifecycle (join, dispatch, close).

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use filehost_plugin::WsScript;
use filehost_plugin::connection::{ConnectionId, ConnectionInfo, OutboundFrame, ScriptConnection};

use super::pool::{ConnectionPool, LiveConnection};

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Connection pool.
    pool: ConnectionPool,
    /// Capacity of each connection's outbound queue.
    outbound_buffer: usize,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(outbound_buffer: usize) -> Self {
        Self {
            pool: ConnectionPool::new(),
            outbound_buffer: outbound_buffer.max(1),
        }
    }

    /// Creates the handle for a freshly upgraded socket.
    ///
    /// The connection is not live until [`activate`](Self::activate) ran.
    pub fn open(
        &self,
        ip: String,
        path: String,
        cookies: HashMap<String, String>,
    ) -> (Arc<ScriptConnection>, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(self.outbound_buffer);
        (Arc::new(ScriptConnection::new(ip, path, cookies, tx)), rx)
    }

    /// Runs the script's join handler, then registers the connection.
    ///
    /// The connection is registered even if the handler panicked, so the
    /// regular close path cleans it up. Returns false in that case.
    pub async fn activate(&self, conn: Arc<ScriptConnection>, script: Arc<dyn WsScript>) -> bool {
        let joined = guarded(&conn.id, "join", script.join(conn.clone())).await;
        info!(
            conn_id = %conn.id,
            ip = %conn.ip,
            path = %conn.path,
            "WebSocket connection registered"
        );
        self.pool.add(LiveConnection { conn, script });
        joined
    }

    /// Hands one inbound payload to the bound script.
    ///
    /// Payloads that are not JSON arrive as an empty object. Messages for a
    /// connection that is no longer registered are dropped.
    pub async fn dispatch(&self, conn_id: &ConnectionId, payload: &[u8]) {
        let Some(live) = self.pool.get(conn_id) else {
            debug!(conn_id = %conn_id, "Message for unregistered connection dropped");
            return;
        };

        let message = parse_message(payload);
        guarded(conn_id, "message", live.script.message(live.conn, message)).await;
    }

    /// Removes a connection and runs its close handler.
    ///
    /// Returns false if the connection was already closed; the close handler
    /// runs at most once per connection.
    pub async fn close(&self, conn_id: &ConnectionId) -> bool {
        let Some(live) = self.pool.remove(conn_id) else {
            return false;
        };
        live.conn.close();
        live.conn.mark_closed();
        guarded(conn_id, "close", live.script.close(live.conn.clone())).await;
        info!(conn_id = %conn_id, path = %live.conn.path, "WebSocket connection unregistered");
        true
    }

    /// Snapshot of all live connections.
    pub fn list(&self) -> Vec<ConnectionInfo> {
        self.pool
            .all_connections()
            .iter()
            .map(|live| live.conn.info())
            .collect()
    }

    /// Asks every live connection's transport to close.
    ///
    /// Each session then unregisters itself through [`close`](Self::close).
    pub fn close_all(&self) -> usize {
        let connections = self.pool.all_connections();
        for live in &connections {
            live.conn.close();
        }
        if !connections.is_empty() {
            warn!(count = connections.len(), "Closing all WebSocket connections");
        }
        connections.len()
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }
}

/// Awaits one script handler, containing a panic to that call.
async fn guarded<F>(conn_id: &ConnectionId, event: &'static str, handler: F) -> bool
where
    F: Future<Output = ()>,
{
    match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(()) => true,
        Err(_) => {
            error!(conn_id = %conn_id, event, "WebSocket script handler panicked");
            false
        }
    }
}

fn parse_message(payload: &[u8]) -> serde_json::Value {
    serde_json::from_slice(payload)
        .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()))
}
