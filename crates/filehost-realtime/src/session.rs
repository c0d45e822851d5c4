//! Per-connection session state machine.
//!
//! ```text
//! Requested → Validated → Upgraded → Active → Closed
//! ```
//!
//! `Requested → Validated` happens in [`validate_upgrade`](crate::upgrade::validate_upgrade).
//! A [`WsSession`] is created once the handshake completed (`Upgraded`) and
//! drives the rest.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use filehost_plugin::WsScript;
use filehost_plugin::connection::{OutboundFrame, ScriptConnection};

use crate::connection::manager::ConnectionManager;
use crate::upgrade::ValidatedUpgrade;

/// Lifecycle state of a WebSocket session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Upgrade requested, not yet checked.
    Requested,
    /// Authorization and target checks passed.
    Validated,
    /// Handshake completed; IP and cookies attached.
    Upgraded,
    /// Joined and registered; messages are dispatched.
    Active,
    /// Unregistered; no further events.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => write!(f, "requested"),
            Self::Validated => write!(f, "validated"),
            Self::Upgraded => write!(f, "upgraded"),
            Self::Active => write!(f, "active"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// A frame received from the client, already stripped of control frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// Text frame.
    Text(String),
    /// Binary frame; parsed as UTF-8 JSON like text.
    Binary(Bytes),
    /// The client closed the socket.
    Close,
}

/// One upgraded connection.
#[derive(Debug)]
pub struct WsSession {
    manager: Arc<ConnectionManager>,
    conn: Arc<ScriptConnection>,
    script: Arc<dyn WsScript>,
    state: SessionState,
}

impl WsSession {
    /// Creates the session for a completed handshake.
    ///
    /// Returns the receiver the transport must drain into the socket.
    pub fn upgraded(
        manager: Arc<ConnectionManager>,
        upgrade: ValidatedUpgrade,
        ip: String,
        cookies: HashMap<String, String>,
    ) -> (Self, mpsc::Receiver<OutboundFrame>) {
        let (conn, rx) = manager.open(ip, upgrade.site_path, cookies);
        let session = Self {
            manager,
            conn,
            script: upgrade.script,
            state: SessionState::Upgraded,
        };
        (session, rx)
    }

    /// The connection handle.
    pub fn connection(&self) -> &Arc<ScriptConnection> {
        &self.conn
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Joins, dispatches every inbound frame in order, then closes.
    ///
    /// Returns when the stream ends, the client closes, or the connection
    /// was closed from the server side.
    pub async fn run<S>(mut self, mut inbound: S) -> SessionState
    where
        S: Stream<Item = InboundFrame> + Unpin,
    {
        let joined = self
            .manager
            .activate(self.conn.clone(), self.script.clone())
            .await;
        self.transition(SessionState::Active);

        if joined {
            while let Some(frame) = inbound.next().await {
                if !self.conn.is_alive() {
                    break;
                }
                match frame {
                    InboundFrame::Text(text) => {
                        self.manager.dispatch(&self.conn.id, text.as_bytes()).await
                    }
                    InboundFrame::Binary(data) => self.manager.dispatch(&self.conn.id, &data).await,
                    InboundFrame::Close => break,
                }
            }
        }

        self.manager.close(&self.conn.id).await;
        self.transition(SessionState::Closed);
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        debug!(conn_id = %self.conn.id, from = %self.state, to = %next, "Session state change");
        self.state = next;
    }
}
