//! Script registry: maps site paths and file names to script handlers.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use filehost_core::error::AppError;
use filehost_core::result::AppResult;

use crate::traits::{HttpScript, WsScript};

/// Kind of a registered script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    /// Handles plain HTTP requests.
    Http,
    /// Handles WebSocket connections.
    Ws,
}

/// Metadata about a registered script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptInfo {
    /// Registration key: a site path or a bare file name.
    pub key: String,
    /// Script kind.
    pub kind: ScriptKind,
}

/// Registry of HTTP and WebSocket scripts.
///
/// A lookup tries the full site path first (`private/game.js`), then the
/// file name alone (`game.js`), so a script can be pinned to one location
/// or serve every allow-listed file with its name.
#[derive(Debug, Default)]
pub struct ScriptRegistry {
    http: RwLock<HashMap<String, Arc<dyn HttpScript>>>,
    ws: RwLock<HashMap<String, Arc<dyn WsScript>>>,
}

impl ScriptRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an HTTP script under a site path or file name.
    pub async fn register_http(
        &self,
        key: impl Into<String>,
        script: Arc<dyn HttpScript>,
    ) -> AppResult<()> {
        let key = normalize_key(key.into());
        let mut scripts = self.http.write().await;
        if scripts.contains_key(&key) {
            return Err(AppError::configuration(format!(
                "HTTP script '{key}' is already registered"
            )));
        }
        info!(key = %key, "Registering HTTP script");
        scripts.insert(key, script);
        Ok(())
    }

    /// Registers a WebSocket script under a site path or file name.
    pub async fn register_ws(
        &self,
        key: impl Into<String>,
        script: Arc<dyn WsScript>,
    ) -> AppResult<()> {
        let key = normalize_key(key.into());
        let mut scripts = self.ws.write().await;
        if scripts.contains_key(&key) {
            return Err(AppError::configuration(format!(
                "WS script '{key}' is already registered"
            )));
        }
        info!(key = %key, "Registering WS script");
        scripts.insert(key, script);
        Ok(())
    }

    /// Finds the HTTP script for a resource.
    pub async fn http(&self, site_path: &str, file_name: &str) -> Option<Arc<dyn HttpScript>> {
        let scripts = self.http.read().await;
        scripts
            .get(site_path)
            .or_else(|| scripts.get(file_name))
            .cloned()
    }

    /// Finds the WebSocket script for a resource.
    pub async fn ws(&self, site_path: &str, file_name: &str) -> Option<Arc<dyn WsScript>> {
        let scripts = self.ws.read().await;
        scripts
            .get(site_path)
            .or_else(|| scripts.get(file_name))
            .cloned()
    }

    /// Lists all registrations, sorted by key.
    pub async fn list(&self) -> Vec<ScriptInfo> {
        let mut infos: Vec<ScriptInfo> = self
            .http
            .read()
            .await
            .keys()
            .map(|key| ScriptInfo {
                key: key.clone(),
                kind: ScriptKind::Http,
            })
            .chain(self.ws.read().await.keys().map(|key| ScriptInfo {
                key: key.clone(),
                kind: ScriptKind::Ws,
            }))
            .collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        infos
    }
}

fn normalize_key(key: String) -> String {
    key.trim_matches('/').to_string()
}
