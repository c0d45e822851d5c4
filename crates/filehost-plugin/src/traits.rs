//! Script contracts.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use filehost_core::result::AppResult;

use crate::connection::ScriptConnection;

/// Input handed to an HTTP script.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScriptRequest {
    /// Remote address of the caller.
    pub ip: String,
    /// Parsed query string parameters.
    pub query: HashMap<String, String>,
    /// Parsed request cookies, credentials included.
    #[serde(skip)]
    pub cookies: HashMap<String, String>,
}

/// Output of an HTTP script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptResponse {
    /// Content type of `body`.
    pub mime_type: String,
    /// Response body.
    pub body: Bytes,
}

impl ScriptResponse {
    /// Creates a response with the given MIME type.
    pub fn new(mime_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            mime_type: mime_type.into(),
            body: body.into(),
        }
    }

    /// Creates a `text/html` response.
    pub fn html(body: impl Into<String>) -> Self {
        Self::new("text/html", body.into())
    }

    /// Creates an `application/json` response.
    pub fn json<T: Serialize>(value: &T) -> AppResult<Self> {
        Ok(Self::new("application/json", serde_json::to_vec(value)?))
    }
}

/// A script that produces dynamic HTTP content.
///
/// `Ok(None)` means the script produced nothing usable; the caller then
/// serves the "Broken script" fallback page. `Err` becomes a 500.
#[async_trait]
pub trait HttpScript: Send + Sync + std::fmt::Debug + 'static {
    /// Handles one request.
    async fn call(&self, request: ScriptRequest) -> AppResult<Option<ScriptResponse>>;
}

/// A script bound to live WebSocket connections.
///
/// Events for one connection arrive in order and never overlap: `join`,
/// then each `message`, then `close`.
#[async_trait]
pub trait WsScript: Send + Sync + std::fmt::Debug + 'static {
    /// Called once the upgrade completed, before the connection is registered.
    async fn join(&self, conn: Arc<ScriptConnection>);

    /// Called for every inbound frame; malformed JSON arrives as `{}`.
    async fn message(&self, conn: Arc<ScriptConnection>, message: serde_json::Value);

    /// Called once after the connection left the live registry.
    async fn close(&self, conn: Arc<ScriptConnection>);
}

/// Adapts an async closure into an [`HttpScript`].
pub struct FnScript<F> {
    name: &'static str,
    handler: F,
}

impl<F> FnScript<F> {
    /// Wraps `handler`; `name` only shows up in debug output.
    pub fn new<Fut>(name: &'static str, handler: F) -> Self
    where
        F: Fn(ScriptRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Option<ScriptResponse>>> + Send + 'static,
    {
        Self { name, handler }
    }
}

impl<F> std::fmt::Debug for FnScript<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnScript").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F, Fut> HttpScript for FnScript<F>
where
    F: Fn(ScriptRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<Option<ScriptResponse>>> + Send + 'static,
{
    async fn call(&self, request: ScriptRequest) -> AppResult<Option<ScriptResponse>> {
        (self.handler)(request).await
    }
}
