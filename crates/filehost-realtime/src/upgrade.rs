//! Upgrade validation (`Requested → Validated`).

use std::sync::Arc;

use tracing::warn;

use filehost_core::error::{AppError, ErrorKind};
use filehost_core::policy::Policy;
use filehost_plugin::WsScript;
use filehost_service::{RequestContext, ResourceKind, ResourceService};

/// Why an upgrade request was refused.
#[derive(Debug, thiserror::Error)]
pub enum UpgradeRejection {
    /// WebSocket support is turned off.
    #[error("WebSocket is disabled")]
    Disabled,
    /// The group selector is not held by the caller.
    #[error("group not granted")]
    Forbidden,
    /// The path could not be decoded or tried to traverse.
    #[error("bad path")]
    BadPath,
    /// Nothing exists at the path.
    #[error("not found")]
    NotFound,
    /// The target is not an allow-listed ws-script.
    #[error("not a ws script")]
    NotWsScript,
    /// No handler is registered for the ws-script.
    #[error("no handler registered for {0}")]
    NoHandler(String),
    /// Classification failed.
    #[error("validation failed: {0}")]
    Failed(#[source] AppError),
}

/// An upgrade that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedUpgrade {
    /// Site path of the ws-script, e.g. `all/chat.js`.
    pub site_path: String,
    /// Script bound to the connection.
    pub script: Arc<dyn WsScript>,
}

/// Validates an upgrade request for `url_path`.
///
/// Applies the same group check as plain requests, then requires an
/// existing, allow-listed ws-script with a registered handler.
pub async fn validate_upgrade(
    resources: &ResourceService,
    policy: &Policy,
    ctx: &RequestContext,
    url_path: &str,
) -> Result<ValidatedUpgrade, UpgradeRejection> {
    if !policy.ws_enabled {
        return Err(UpgradeRejection::Disabled);
    }

    let resource = match resources.classify(policy, ctx, url_path).await {
        Ok(resource) => resource,
        Err(e) if e.is(ErrorKind::Forbidden) => return Err(UpgradeRejection::Forbidden),
        Err(e) if e.is(ErrorKind::BadPath) => return Err(UpgradeRejection::BadPath),
        Err(e) => return Err(UpgradeRejection::Failed(e)),
    };

    match resource.kind {
        ResourceKind::WsScript => {}
        ResourceKind::NotFound => return Err(UpgradeRejection::NotFound),
        _ => return Err(UpgradeRejection::NotWsScript),
    }

    let site_path = resource.path.site_path();
    let Some(script) = resources
        .scripts()
        .ws(&site_path, resource.path.file_name())
        .await
    else {
        warn!(path = %site_path, "WS script has no registered handler");
        return Err(UpgradeRejection::NoHandler(site_path));
    };

    Ok(ValidatedUpgrade { site_path, script })
}
