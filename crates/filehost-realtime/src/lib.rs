//! # filehost-realtime
//!
//! WebSocket session manager for FileHost. Provides:
//!
//! - Upgrade validation against the same group check as plain requests
//! - A live-connection pool bound to WebSocket scripts
//! - The per-connection session state machine
//!   (`Requested → Validated → Upgraded → Active → Closed`)
//!
//! The crate is transport-agnostic: the HTTP layer feeds decoded frames in
//! and drains [`OutboundFrame`](filehost_plugin::OutboundFrame)s out.

pub mod connection;
pub mod session;
pub mod upgrade;

pub use connection::manager::ConnectionManager;
pub use connection::pool::{ConnectionPool, LiveConnection};
pub use session::{InboundFrame, SessionState, WsSession};
pub use upgrade::{UpgradeRejection, ValidatedUpgrade, validate_upgrade};
