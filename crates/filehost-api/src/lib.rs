//! # filehost-api
//!
//! HTTP layer for FileHost built on Axum.
//!
//! Provides the built-in pages, the resource fallback route (which also
//! takes WebSocket upgrades), extractors for the caller's address and
//! groups, request logging, and the mapping from `AppError` to the HTML
//! error pages.

pub mod app;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
