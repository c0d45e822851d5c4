//! Built-in pages: site root, login form, favicon.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};

use filehost_service::pages::login_page;

use crate::error::ApiError;
use crate::extractors::Caller;
use crate::state::AppState;

/// GET / and /index.html
pub async fn index(State(state): State<AppState>, caller: Caller) -> Html<String> {
    Html(state.resources.index(&caller.policy, &caller.ctx).await)
}

/// GET /login.html
pub async fn login(State(state): State<AppState>) -> Html<String> {
    Html(login_page(&state.policies.snapshot().site_name))
}

/// GET /favicon.ico
pub async fn favicon(State(state): State<AppState>) -> Result<Response, ApiError> {
    let policy = state.policies.snapshot();
    Ok(match state.resources.favicon(&policy).await? {
        Some(icon) => ([(header::CONTENT_TYPE, "image/x-icon")], icon).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}
