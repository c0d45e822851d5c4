//! `echo.js`: sends every message back to its sender.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::connection::ScriptConnection;
use crate::traits::WsScript;

/// WebSocket script that echoes each parsed message as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct Echo;

#[async_trait]
impl WsScript for Echo {
    async fn join(&self, conn: Arc<ScriptConnection>) {
        debug!(conn_id = %conn.id, ip = %conn.ip, "Echo client joined");
    }

    async fn message(&self, conn: Arc<ScriptConnection>, message: serde_json::Value) {
        conn.send_json(&message);
    }

    async fn close(&self, conn: Arc<ScriptConnection>) {
        debug!(conn_id = %conn.id, "Echo client left");
    }
}
