//! WebSocket configuration.

use serde::{Deserialize, Serialize};

/// WebSocket settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsConfig {
    /// Whether WebSocket upgrades are accepted at all.
    #[serde(default)]
    pub enabled: bool,
    /// File names handled by WebSocket scripts.
    #[serde(default)]
    pub scripts: Vec<String>,
    /// Per-connection outbound message buffer.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            scripts: Vec::new(),
            outbound_buffer: default_outbound_buffer(),
        }
    }
}

fn default_outbound_buffer() -> usize {
    64
}
