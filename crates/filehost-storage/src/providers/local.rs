//! Local filesystem provider.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use filehost_core::error::{AppError, ErrorKind};
use filehost_core::result::AppResult;
use filehost_core::traits::storage::{DirEntry, EntryKind, FileSystem};

/// Tokio-backed access to the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    /// Creates a new local filesystem provider.
    pub fn new() -> Self {
        Self
    }
}

/// Every failure past the existence check is a storage error, including a
/// file that vanished in between.
fn storage_error(err: std::io::Error) -> AppError {
    AppError::with_source(ErrorKind::Storage, err.to_string(), err)
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn entry_kind(&self, path: &Path) -> AppResult<Option<EntryKind>> {
        match fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Directory)),
            Ok(_) => Ok(Some(EntryKind::File)),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn canonicalize(&self, path: &Path) -> AppResult<PathBuf> {
        fs::canonicalize(path).await.map_err(storage_error)
    }

    async fn read(&self, path: &Path) -> AppResult<Bytes> {
        let data = fs::read(path).await.map_err(storage_error)?;
        debug!(path = %path.display(), bytes = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    async fn read_dir(&self, path: &Path) -> AppResult<Vec<DirEntry>> {
        let mut reader = fs::read_dir(path).await.map_err(storage_error)?;
        let mut entries = Vec::new();

        while let Some(entry) = reader.next_entry().await.map_err(storage_error)? {
            // Follow symlinks so a linked directory lists as a directory.
            let kind = match fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_dir() => EntryKind::Directory,
                _ => EntryKind::File,
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }

        Ok(entries)
    }
}
