//! Maps domain `AppError` to HTTP responses.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use filehost_core::error::{AppError, ErrorKind};
use filehost_service::pages::{BAD_PATH_BODY, FORBIDDEN_BODY, NOT_FOUND_BODY, error_body};

/// HTTP-facing wrapper around [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        match err.kind {
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, Html(NOT_FOUND_BODY)).into_response(),
            ErrorKind::Forbidden => {
                (StatusCode::UNAUTHORIZED, Html(FORBIDDEN_BODY)).into_response()
            }
            ErrorKind::BadPath => {
                tracing::debug!(error = %err.message, "Rejected request path");
                (StatusCode::BAD_REQUEST, Html(BAD_PATH_BODY)).into_response()
            }
            _ => {
                tracing::error!(kind = %err.kind, error = %err.message, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(error_body(&err.message)),
                )
                    .into_response()
            }
        }
    }
}
