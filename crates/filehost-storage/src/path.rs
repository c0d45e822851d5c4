//! URL path → file-root path resolution.
//!
//! A request path is `/<group>/<segment>/...`. The first segment is the
//! group selector and is checked against the caller's groups before any
//! other work; the remaining segments are percent-decoded one by one and
//! rejected if they could step outside the group directory.

use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use filehost_core::error::AppError;
use filehost_core::result::AppResult;
use filehost_core::traits::storage::FileSystem;
use filehost_core::types::GroupName;

/// Characters escaped when a segment is written back into an href.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\');

/// Returns the group selector (normalized first segment) of a URL path.
///
/// Performs no validation beyond decoding; an odd selector simply never
/// matches a granted group.
pub fn group_selector(url_path: &str) -> GroupName {
    let first = url_path.split('/').find(|s| !s.is_empty()).unwrap_or("");
    GroupName::new(&percent_decode_str(first).decode_utf8_lossy())
}

/// A validated site path: a group plus decoded, traversal-free segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourcePath {
    group: GroupName,
    segments: Vec<String>,
}

impl ResourcePath {
    /// Parses a URL path such as `/private/notes/a%20b.txt`.
    pub fn parse(url_path: &str) -> AppResult<Self> {
        let mut raw = url_path.split('/').filter(|s| !s.is_empty());

        let group = raw
            .next()
            .ok_or_else(|| AppError::bad_path("Path has no group segment"))?;
        let group = GroupName::new(&decode_segment(group)?);

        let mut segments = Vec::new();
        for segment in raw {
            let decoded = decode_segment(segment)?;
            if decoded != "." {
                segments.push(decoded);
            }
        }

        Ok(Self { group, segments })
    }

    /// The top-level directory of a group.
    pub fn for_group(group: GroupName) -> Self {
        Self {
            group,
            segments: Vec::new(),
        }
    }

    /// Returns the path of a direct child entry.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self {
            group: self.group.clone(),
            segments,
        }
    }

    /// The group selector.
    pub fn group(&self) -> &GroupName {
        &self.group
    }

    /// Decoded segments below the group directory.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment; the group name for a group root.
    pub fn file_name(&self) -> &str {
        self.segments
            .last()
            .map(String::as_str)
            .unwrap_or_else(|| self.group.as_str())
    }

    /// Slash-joined path relative to the file root, e.g. `private/notes/a b.txt`.
    pub fn site_path(&self) -> String {
        std::iter::once(self.group.as_str())
            .chain(self.segments.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Absolute, percent-encoded URL path suitable for an href.
    pub fn href(&self) -> String {
        std::iter::once(self.group.as_str())
            .chain(self.segments.iter().map(String::as_str))
            .map(|s| format!("/{}", utf8_percent_encode(s, SEGMENT)))
            .collect()
    }

    /// Joins this path onto the file root.
    pub fn to_fs_path(&self, root: &Path) -> PathBuf {
        let mut path = root.join(self.group.as_str());
        for segment in &self.segments {
            path.push(segment);
        }
        path
    }
}

fn decode_segment(raw: &str) -> AppResult<String> {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| AppError::bad_path("Path is not valid UTF-8"))?;

    if decoded == ".."
        || decoded.contains('/')
        || decoded.contains('\\')
        || decoded.contains('\0')
    {
        return Err(AppError::bad_path(format!("Invalid path segment: {raw}")));
    }

    Ok(decoded.into_owned())
}

/// Canonicalizes an existing path and checks it is still under `root`.
///
/// Catches symlinks that point outside the file root.
pub async fn ensure_contained(fs: &dyn FileSystem, root: &Path, path: &Path) -> AppResult<PathBuf> {
    let root = fs.canonicalize(root).await?;
    let resolved = fs.canonicalize(path).await?;

    if resolved.starts_with(&root) {
        Ok(resolved)
    } else {
        Err(AppError::forbidden(format!(
            "Resolved path escapes the file root: {}",
            path.display()
        )))
    }
}
