//! Handle to a live WebSocket connection, as seen by scripts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// Frame queued for delivery to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// A text frame.
    Text(String),
    /// Close the socket.
    Close,
}

/// A handle to a single WebSocket connection.
///
/// Holds the sender half of the connection's outbound queue plus the
/// caller's address and cookies captured at upgrade time.
#[derive(Debug)]
pub struct ScriptConnection {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Remote address of the caller.
    pub ip: String,
    /// Site path the connection was opened on, e.g. `all/chat.js`.
    pub path: String,
    /// Cookies sent with the upgrade request.
    pub cookies: HashMap<String, String>,
    /// When the upgrade completed.
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<OutboundFrame>,
    alive: AtomicBool,
}

impl ScriptConnection {
    /// Creates a new connection handle.
    pub fn new(
        ip: String,
        path: String,
        cookies: HashMap<String, String>,
        sender: mpsc::Sender<OutboundFrame>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ip,
            path,
            cookies,
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
        }
    }

    /// Queues a text frame. Returns false if the frame was dropped.
    pub fn send_text(&self, text: impl Into<String>) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(OutboundFrame::Text(text.into())) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Serializes `value` and queues it as a text frame.
    pub fn send_json<T: Serialize>(&self, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(text) => self.send_text(text),
            Err(e) => {
                tracing::error!(conn_id = %self.id, error = %e, "Failed to serialize message");
                false
            }
        }
    }

    /// Asks the transport to close the socket.
    pub fn close(&self) {
        if self.is_alive() {
            let _ = self.sender.try_send(OutboundFrame::Close);
        }
    }

    /// Whether the connection is still open.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Marks the connection closed. Returns true for the first caller only.
    pub fn mark_closed(&self) -> bool {
        self.alive.swap(false, Ordering::SeqCst)
    }

    /// Snapshot of the connection for listings.
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            ip: self.ip.clone(),
            path: self.path.clone(),
            connected_at: self.connected_at,
            alive: self.is_alive(),
        }
    }
}

/// Snapshot of connection info (serializable, without cookies).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Connection ID.
    pub id: ConnectionId,
    /// Remote address.
    pub ip: String,
    /// Site path.
    pub path: String,
    /// Connected at.
    pub connected_at: DateTime<Utc>,
    /// Is alive.
    pub alive: bool,
}
