//! Filesystem trait used by the resource router.
//!
//! Every filesystem touch made while serving a request goes through
//! [`FileSystem`], so the authorization-before-access ordering can be
//! checked with a stub that fails when called.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Kind of an existing filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A regular file (or anything that is not a directory).
    File,
    /// A directory.
    Directory,
}

/// One entry of a directory enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name (not a full path).
    pub name: String,
    /// Entry kind.
    pub kind: EntryKind,
}

/// Asynchronous read-only filesystem access.
#[async_trait]
pub trait FileSystem: Send + Sync + std::fmt::Debug + 'static {
    /// Returns the entry kind, or `None` if nothing exists at `path`.
    async fn entry_kind(&self, path: &Path) -> AppResult<Option<EntryKind>>;

    /// Resolves symlinks and relative components of an existing path.
    async fn canonicalize(&self, path: &Path) -> AppResult<PathBuf>;

    /// Reads a whole file into memory.
    async fn read(&self, path: &Path) -> AppResult<Bytes>;

    /// Enumerates a directory in filesystem order.
    async fn read_dir(&self, path: &Path) -> AppResult<Vec<DirEntry>>;
}
