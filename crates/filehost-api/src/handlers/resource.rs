//! Fallback handler: every path that is not a built-in page.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};

use filehost_core::error::AppError;
use filehost_service::ResourceResponse;

use crate::error::ApiError;
use crate::extractors::Caller;
use crate::handlers::ws;
use crate::state::AppState;

/// ANY /{group}/{path..}
///
/// WebSocket upgrade requests are handed to [`ws::upgrade`].
pub async fn serve(State(state): State<AppState>, caller: Caller, request: Request) -> Response {
    if ws::is_upgrade_request(request.headers()) {
        return ws::upgrade(state, caller, request).await;
    }

    let path = request.uri().path();
    match state.resources.serve(&caller.policy, &caller.ctx, path).await {
        Ok(response) => into_http(response).unwrap_or_else(IntoResponse::into_response),
        Err(e) => ApiError(e).into_response(),
    }
}

fn into_http(response: ResourceResponse) -> Result<Response, ApiError> {
    Ok(match response {
        ResourceResponse::Html(body) => Html(body).into_response(),
        ResourceResponse::File { mime_type, body } => {
            ([(header::CONTENT_TYPE, content_type(&mime_type))], body).into_response()
        }
        ResourceResponse::Script(script) => {
            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_TYPE, content_type(&script.mime_type));
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            );
            (headers, script.body).into_response()
        }
        ResourceResponse::Redirect(target) => {
            let location = HeaderValue::from_str(&target)
                .map_err(|_| AppError::internal(format!("Invalid redirect target: {target}")))?;
            (
                StatusCode::TEMPORARY_REDIRECT,
                [(header::LOCATION, location)],
            )
                .into_response()
        }
    })
}

fn content_type(mime_type: &str) -> HeaderValue {
    HeaderValue::from_str(mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
}
