//! Connection pool: tracks all active connections and their scripts.

use std::sync::Arc;

use dashmap::DashMap;

use filehost_plugin::WsScript;
use filehost_plugin::connection::{ConnectionId, ScriptConnection};

/// A registered connection and the script it is bound to.
#[derive(Debug, Clone)]
pub struct LiveConnection {
    /// Connection handle shared with the script.
    pub conn: Arc<ScriptConnection>,
    /// Bound script.
    pub script: Arc<dyn WsScript>,
}

/// Thread-safe pool of all active WebSocket connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    by_id: DashMap<ConnectionId, LiveConnection>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the pool.
    pub fn add(&self, live: LiveConnection) {
        self.by_id.insert(live.conn.id, live);
    }

    /// Removes a connection. Only the first call for an ID returns it.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<LiveConnection> {
        self.by_id.remove(conn_id).map(|(_, live)| live)
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<LiveConnection> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Returns all connections.
    pub fn all_connections(&self) -> Vec<LiveConnection> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }
}
