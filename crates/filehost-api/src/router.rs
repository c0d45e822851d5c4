//! Route definitions for the FileHost HTTP surface.
//!
//! A handful of fixed pages; every other path is a resource under the file
//! root and goes to the fallback, which also accepts WebSocket upgrades.

use axum::Router;
use axum::routing::get;

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::pages::index))
        .route("/index.html", get(handlers::pages::index))
        .route("/login.html", get(handlers::pages::login))
        .route("/favicon.ico", get(handlers::pages::favicon))
        .fallback(handlers::resource::serve)
        .with_state(state)
}
