//! Custom Axum extractors.

pub mod caller;
pub mod client_ip;

pub use caller::Caller;
pub use client_ip::ClientIp;
