//! # filehost-plugin
//!
//! Server-side scripts for FileHost.
//!
//! Scripts are not loaded from disk. Handlers are registered in a
//! [`ScriptRegistry`] under a site path (`private/game.js`) or a bare file
//! name (`game.js`); the allow-lists in the access policy still decide
//! whether a file on disk is treated as a script at all.
//!
//! - [`HttpScript`] answers one request with a MIME type and a body.
//! - [`WsScript`] receives join/message/close events for a live socket.

pub mod builtin;
pub mod connection;
pub mod registry;
pub mod traits;

pub use builtin::register_builtin;
pub use connection::{ConnectionInfo, OutboundFrame, ScriptConnection};
pub use registry::ScriptRegistry;
pub use traits::{FnScript, HttpScript, ScriptRequest, ScriptResponse, WsScript};
