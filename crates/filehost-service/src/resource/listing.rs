//! Directory listings.

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;
use tracing::warn;

use filehost_core::error::AppError;
use filehost_core::policy::Policy;
use filehost_core::result::AppResult;
use filehost_core::traits::storage::{EntryKind, FileSystem};
use filehost_core::types::GroupSet;
use filehost_storage::{ResourcePath, ensure_contained};

use crate::pages::EMPTY_LISTING;

/// How a listed entry is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    /// Sub-directory.
    Directory,
    /// Allow-listed HTTP script.
    Script,
    /// Allow-listed redirect.
    Redirect,
    /// Anything else.
    File,
}

impl ListingKind {
    fn icon(self) -> &'static str {
        match self {
            Self::Directory => "📁",
            Self::Script => "📜",
            Self::Redirect => "🔗",
            Self::File => "📑",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Directory => " (dir)",
            Self::Script => " (script)",
            Self::Redirect => " (redirect)",
            Self::File => "",
        }
    }
}

/// One entry of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    /// Entry name as found on disk.
    pub name: String,
    /// Absolute, percent-encoded link to the entry.
    pub href: String,
    /// Presentation kind.
    pub kind: ListingKind,
}

/// A rendered-on-demand directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryListing {
    /// Site path of the directory, e.g. `private/notes`.
    pub site_path: String,
    /// Visible entries in filesystem enumeration order.
    pub entries: Vec<ListingEntry>,
}

impl DirectoryListing {
    /// Lists the directory at `path`.
    ///
    /// When WebSocket is enabled, ws-scripts are hidden: they are only
    /// reachable through an upgrade.
    pub async fn read(fs: &dyn FileSystem, policy: &Policy, path: &ResourcePath) -> AppResult<Self> {
        let fs_path = path.to_fs_path(&policy.files_root);
        let entries = fs
            .read_dir(&fs_path)
            .await?
            .into_iter()
            .filter(|entry| !(policy.ws_enabled && policy.is_ws_script(&entry.name)))
            .map(|entry| {
                let kind = if entry.kind == EntryKind::Directory {
                    ListingKind::Directory
                } else if policy.is_script(&entry.name) {
                    ListingKind::Script
                } else if policy.is_redirect(&entry.name) {
                    ListingKind::Redirect
                } else {
                    ListingKind::File
                };
                ListingEntry {
                    href: path.child(&entry.name).href(),
                    name: entry.name,
                    kind,
                }
            })
            .collect();

        Ok(Self {
            site_path: path.site_path(),
            entries,
        })
    }

    /// An empty listing for `path`.
    pub fn empty(path: &ResourcePath) -> Self {
        Self {
            site_path: path.site_path(),
            entries: Vec::new(),
        }
    }

    /// Renders the listing as an HTML fragment.
    pub fn render(&self) -> String {
        let mut out = format!("/{}:<br>", encode_text(&self.site_path));
        if self.entries.is_empty() {
            out.push_str(EMPTY_LISTING);
            return out;
        }

        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push_str("<br>");
            }
            let _ = write!(
                out,
                r#"{}&nbsp;<a href="{}">{}{}</a>"#,
                entry.kind.icon(),
                encode_double_quoted_attribute(&entry.href),
                encode_text(&entry.name),
                entry.kind.suffix()
            );
        }
        out
    }
}

/// Renders one listing per group in `groups`, in order.
///
/// A group whose directory is missing or unreadable is rendered empty and
/// logged; it never fails the page.
pub async fn root_listing(fs: &dyn FileSystem, policy: &Policy, groups: &GroupSet) -> String {
    let mut sections = Vec::with_capacity(groups.len());
    for group in groups.iter() {
        let path = ResourcePath::for_group(group.clone());
        let listing = match read_group(fs, policy, &path).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(group = %group, error = %e, "Group directory cannot be listed");
                DirectoryListing::empty(&path)
            }
        };
        sections.push(listing.render());
    }
    sections.join("<br><br>")
}

async fn read_group(
    fs: &dyn FileSystem,
    policy: &Policy,
    path: &ResourcePath,
) -> AppResult<DirectoryListing> {
    let fs_path = path.to_fs_path(&policy.files_root);
    match fs.entry_kind(&fs_path).await? {
        Some(EntryKind::Directory) => {}
        Some(EntryKind::File) => {
            return Err(AppError::storage(format!(
                "{} is not a directory",
                fs_path.display()
            )));
        }
        None => {
            return Err(AppError::not_found(format!(
                "{} does not exist",
                fs_path.display()
            )));
        }
    }
    ensure_contained(fs, &policy.files_root, &fs_path).await?;
    DirectoryListing::read(fs, policy, path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::write;
    use filehost_core::config::HostConfig;
    use filehost_core::types::GroupName;
    use filehost_storage::LocalFileSystem;

    fn policy(root: &std::path::Path, ws_enabled: bool) -> Policy {
        let mut config = HostConfig::from_toml(
            r#"
            groups = ["private"]
            scripts = ["run.js"]
            redirects = ["go.url"]

            [ws]
            scripts = ["chat.js"]
            "#,
        )
        .unwrap();
        config.files_dir = root.display().to_string();
        config.ws.enabled = ws_enabled;
        Policy::from_config(&config)
    }

    fn sorted(mut listing: DirectoryListing) -> DirectoryListing {
        listing.entries.sort_by(|a, b| a.name.cmp(&b.name));
        listing
    }

    #[tokio::test]
    async fn test_entries_are_tagged_by_kind() {
        let root = tempfile::tempdir().unwrap();
        for file in ["all/run.js", "all/go.url", "all/a b.txt"] {
            write(root.path(), file, "x");
        }
        std::fs::create_dir(root.path().join("all/sub")).unwrap();

        let policy = policy(root.path(), false);
        let path = ResourcePath::for_group(GroupName::all());
        let listing = sorted(
            DirectoryListing::read(&LocalFileSystem::new(), &policy, &path)
                .await
                .unwrap(),
        );

        let kinds: Vec<(&str, ListingKind)> = listing
            .entries
            .iter()
            .map(|e| (e.name.as_str(), e.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("a b.txt", ListingKind::File),
                ("go.url", ListingKind::Redirect),
                ("run.js", ListingKind::Script),
                ("sub", ListingKind::Directory),
            ]
        );
        assert_eq!(listing.entries[0].href, "/all/a%20b.txt");

        let html = listing.render();
        assert!(html.starts_with("/all:<br>"));
        assert!(html.contains(r#"📁&nbsp;<a href="/all/sub">sub (dir)</a>"#));
        assert!(html.contains(r#"📜&nbsp;<a href="/all/run.js">run.js (script)</a>"#));
        assert!(html.contains(r#"🔗&nbsp;<a href="/all/go.url">go.url (redirect)</a>"#));
        assert!(html.contains(r#"📑&nbsp;<a href="/all/a%20b.txt">a b.txt</a>"#));
    }

    #[tokio::test]
    async fn test_ws_scripts_hidden_only_when_ws_enabled() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "all/chat.js", "x");
        let path = ResourcePath::for_group(GroupName::all());
        let fs = LocalFileSystem::new();

        let hidden = DirectoryListing::read(&fs, &policy(root.path(), true), &path)
            .await
            .unwrap();
        assert!(hidden.entries.is_empty());
        assert_eq!(hidden.render(), "/all:<br>There's nothing here!");

        let shown = DirectoryListing::read(&fs, &policy(root.path(), false), &path)
            .await
            .unwrap();
        assert_eq!(shown.entries.len(), 1);
    }

    #[tokio::test]
    async fn test_names_are_escaped() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "all/<b>.txt", "x");
        write(root.path(), "all/a&b.txt", "x");

        let policy = policy(root.path(), false);
        let path = ResourcePath::for_group(GroupName::all());
        let html = DirectoryListing::read(&LocalFileSystem::new(), &policy, &path)
            .await
            .unwrap()
            .render();
        assert!(html.contains("&lt;b&gt;.txt</a>"));
        assert!(html.contains("a&amp;b.txt</a>"));
        assert!(!html.contains("<b>"));
    }

    #[tokio::test]
    async fn test_root_listing_follows_group_order_and_survives_missing_dirs() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "all/pub.txt", "x");

        let policy = policy(root.path(), false);
        let groups = GroupSet::from_granted(vec![GroupName::new("private")]);
        let html = root_listing(&LocalFileSystem::new(), &policy, &groups).await;

        assert_eq!(
            html,
            "/private:<br>There's nothing here!<br><br>/all:<br>📑&nbsp;<a href=\"/all/pub.txt\">pub.txt</a>"
        );
    }
}
