//! Resource classification.
//!
//! Order of checks:
//! 1. Group selector against the caller's groups (no filesystem access).
//! 2. Segment decoding and traversal rejection (no filesystem access).
//! 3. Existence, then containment under the file root.
//! 4. Kind: directory, then ws-script, redirect, script allow-lists, else plain file.

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use filehost_core::error::AppError;
use filehost_core::policy::Policy;
use filehost_core::result::AppResult;
use filehost_core::traits::storage::{EntryKind, FileSystem};
use filehost_core::types::GroupSet;
use filehost_storage::{ResourcePath, ensure_contained, group_selector};

/// Kind of a requested resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A directory; served as a listing.
    Directory,
    /// An allow-listed HTTP script.
    Script,
    /// An allow-listed redirect pointer.
    Redirect,
    /// An allow-listed WebSocket script.
    WsScript,
    /// Any other file.
    PlainFile,
    /// Nothing exists at the path.
    NotFound,
}

/// A classified resource.
#[derive(Debug, Clone)]
pub struct Resource {
    /// Validated site path.
    pub path: ResourcePath,
    /// Filesystem location; canonical unless the kind is `NotFound`.
    pub fs_path: PathBuf,
    /// Classification.
    pub kind: ResourceKind,
}

/// Classifies a URL path for a caller holding `groups`.
///
/// Returns `Forbidden` when the group selector is not held and `BadPath`
/// for undecodable or traversing segments; both before any filesystem access.
pub async fn classify(
    fs: &dyn FileSystem,
    policy: &Policy,
    groups: &GroupSet,
    url_path: &str,
) -> AppResult<Resource> {
    let selector = group_selector(url_path);
    if !groups.contains(&selector) {
        return Err(AppError::forbidden(format!(
            "Group '{selector}' is not granted"
        )));
    }

    let path = ResourcePath::parse(url_path)?;
    let fs_path = path.to_fs_path(&policy.files_root);

    let Some(entry) = fs.entry_kind(&fs_path).await? else {
        debug!(path = %path.site_path(), "Resource not found");
        return Ok(Resource {
            path,
            fs_path,
            kind: ResourceKind::NotFound,
        });
    };

    let fs_path = ensure_contained(fs, &policy.files_root, &fs_path).await?;

    let file_name = path.file_name();
    let kind = if entry == EntryKind::Directory {
        ResourceKind::Directory
    } else if policy.is_ws_script(file_name) {
        ResourceKind::WsScript
    } else if policy.is_redirect(file_name) {
        ResourceKind::Redirect
    } else if policy.is_script(file_name) {
        ResourceKind::Script
    } else {
        ResourceKind::PlainFile
    };

    debug!(path = %path.site_path(), ?kind, "Resource classified");
    Ok(Resource {
        path,
        fs_path,
        kind,
    })
}
