//! Scripts shipped with the server.
//!
//! Registering them only binds handlers; the file names must still be
//! allow-listed in configuration and exist on disk to be reachable.

pub mod chat;
pub mod client_info;
pub mod echo;

use std::sync::Arc;

use filehost_core::result::AppResult;

use crate::registry::ScriptRegistry;

pub use chat::ChatRoom;
pub use client_info::ClientInfo;
pub use echo::Echo;

/// File name of the client info HTTP script.
pub const CLIENT_INFO_SCRIPT: &str = "info.js";
/// File name of the echo WebSocket script.
pub const ECHO_SCRIPT: &str = "echo.js";
/// File name of the chat WebSocket script.
pub const CHAT_SCRIPT: &str = "chat.js";

/// Registers every built-in script under its bare file name.
pub async fn register_builtin(registry: &ScriptRegistry) -> AppResult<()> {
    registry
        .register_http(CLIENT_INFO_SCRIPT, Arc::new(ClientInfo))
        .await?;
    registry.register_ws(ECHO_SCRIPT, Arc::new(Echo)).await?;
    registry
        .register_ws(CHAT_SCRIPT, Arc::new(ChatRoom::new()))
        .await?;
    Ok(())
}
