//! Live connection tracking.

pub mod manager;
pub mod pool;
