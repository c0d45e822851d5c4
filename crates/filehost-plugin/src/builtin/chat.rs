//! `chat.js`: a single shared room.
//!
//! Every message is relayed to all members, tagged with the sender's IP.
//! Joins and leaves are announced to the remaining members.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use tracing::info;

use crate::connection::{ConnectionId, ScriptConnection};
use crate::traits::WsScript;

/// Event relayed to room members.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Someone entered the room.
    Join {
        /// Joining member's IP.
        ip: String,
        /// Members after the join.
        members: usize,
    },
    /// A member said something.
    Message {
        /// Sender's IP.
        ip: String,
        /// The sender's parsed message.
        message: serde_json::Value,
    },
    /// Someone left the room.
    Leave {
        /// Leaving member's IP.
        ip: String,
        /// Members after the leave.
        members: usize,
    },
}

/// Shared chat room.
#[derive(Debug, Default)]
pub struct ChatRoom {
    members: DashMap<ConnectionId, Arc<ScriptConnection>>,
}

impl ChatRoom {
    /// Creates an empty room.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    fn broadcast(&self, event: &ChatEvent) -> usize {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize chat event");
                return 0;
            }
        };

        // Collect first so no shard lock is held while sending.
        let members: Vec<Arc<ScriptConnection>> =
            self.members.iter().map(|e| e.value().clone()).collect();
        members
            .iter()
            .filter(|conn| conn.send_text(text.clone()))
            .count()
    }
}

#[async_trait]
impl WsScript for ChatRoom {
    async fn join(&self, conn: Arc<ScriptConnection>) {
        self.members.insert(conn.id, conn.clone());
        let members = self.members.len();
        info!(conn_id = %conn.id, ip = %conn.ip, members, "Chat member joined");
        self.broadcast(&ChatEvent::Join {
            ip: conn.ip.clone(),
            members,
        });
    }

    async fn message(&self, conn: Arc<ScriptConnection>, message: serde_json::Value) {
        self.broadcast(&ChatEvent::Message {
            ip: conn.ip.clone(),
            message,
        });
    }

    async fn close(&self, conn: Arc<ScriptConnection>) {
        if self.members.remove(&conn.id).is_none() {
            return;
        }
        let members = self.members.len();
        info!(conn_id = %conn.id, members, "Chat member left");
        self.broadcast(&ChatEvent::Leave {
            ip: conn.ip.clone(),
            members,
        });
    }
}
