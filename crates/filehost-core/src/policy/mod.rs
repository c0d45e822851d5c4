//! Access policy: the normalized view of the configuration consumed by the
//! resource router.
//!
//! A [`Policy`] is immutable once built. Reloading configuration builds a
//! fresh policy and swaps it into the [`PolicyStore`]; requests already in
//! flight keep the snapshot they started with.

pub mod store;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::config::HostConfig;
use crate::types::group::{GroupName, WILDCARD_GROUP};

pub use store::PolicyStore;

/// Groups granted to a configured user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupGrant {
    /// The user listed `*` and may read every configured group.
    Everything,
    /// The user may read exactly these groups.
    Groups(Vec<GroupName>),
}

/// A configured user account.
#[derive(Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Plaintext password, compared verbatim.
    pub password: String,
    /// Groups granted on successful login.
    pub grant: GroupGrant,
}

impl std::fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAccount")
            .field("password", &"***")
            .field("grant", &self.grant)
            .finish()
    }
}

/// Normalized access policy.
#[derive(Debug, Clone)]
pub struct Policy {
    /// Site name shown in page titles.
    pub site_name: String,
    /// Root directory holding one sub-directory per group.
    pub files_root: PathBuf,
    /// Icon served at `/favicon.ico`.
    pub favicon: PathBuf,
    /// Configured groups in display order, excluding the implicit `all`.
    pub groups: Vec<GroupName>,
    /// Username → account.
    pub users: HashMap<String, UserAccount>,
    /// File names handled by HTTP scripts.
    pub scripts: HashSet<String>,
    /// File names whose content is a redirect target.
    pub redirects: HashSet<String>,
    /// Whether WebSocket upgrades are accepted.
    pub ws_enabled: bool,
    /// File names handled by WebSocket scripts.
    pub ws_scripts: HashSet<String>,
    /// Maximum run time of one HTTP script invocation.
    pub script_timeout: Duration,
}

impl Policy {
    /// Builds a policy from raw configuration, repairing what it can.
    ///
    /// Every repair is logged as a warning; none of them is fatal.
    pub fn from_config(config: &HostConfig) -> Self {
        let mut groups: Vec<GroupName> = Vec::with_capacity(config.groups.len());
        for raw in &config.groups {
            let group = GroupName::new(raw);
            if group.is_all() {
                warn!("Group \"all\" is implicit and should not be listed in \"groups\"");
                continue;
            }
            if !is_valid_group_name(group.as_str()) {
                warn!(group = %raw, "Ignoring invalid group name");
                continue;
            }
            if !groups.contains(&group) {
                groups.push(group);
            }
        }

        let mut users = HashMap::with_capacity(config.users.len());
        for (name, entry) in &config.users {
            let Some((password, granted)) = entry.split_first() else {
                warn!(user = %name, "Malformed user entry (password missing), dropping user");
                continue;
            };

            let grant = if granted.iter().any(|g| g.trim() == WILDCARD_GROUP) {
                GroupGrant::Everything
            } else {
                let mut named: Vec<GroupName> = Vec::with_capacity(granted.len());
                for raw in granted {
                    let group = GroupName::new(raw);
                    if is_valid_group_name(group.as_str()) {
                        named.push(group);
                    } else {
                        warn!(user = %name, group = %raw, "Ignoring invalid group name");
                    }
                }
                for group in &named {
                    if !group.is_all() && !groups.contains(group) {
                        warn!(user = %name, group = %group, "User grants a group that is not configured");
                    }
                }
                GroupGrant::Groups(named)
            };

            users.insert(
                name.clone(),
                UserAccount {
                    password: password.clone(),
                    grant,
                },
            );
        }

        for redirect in &config.redirects {
            if !redirect.ends_with(".url") {
                warn!(redirect = %redirect, "Redirect does not end in \".url\"");
            }
        }

        let mut ws_enabled = config.ws.enabled;
        if ws_enabled && config.ws.scripts.is_empty() {
            warn!("WebSocket enabled without any ws scripts, disabling WebSocket");
            ws_enabled = false;
        }

        let mut timeout_seconds = config.script_runtime.timeout_seconds;
        if timeout_seconds == 0 {
            warn!("Script timeout of 0 seconds would fail every script, using 1 second");
            timeout_seconds = 1;
        }

        Self {
            site_name: config.name.clone(),
            files_root: PathBuf::from(&config.files_dir),
            favicon: PathBuf::from(&config.favicon),
            groups,
            users,
            scripts: config.scripts.iter().cloned().collect(),
            redirects: config.redirects.iter().cloned().collect(),
            ws_enabled,
            ws_scripts: config.ws.scripts.iter().cloned().collect(),
            script_timeout: Duration::from_secs(timeout_seconds),
        }
    }

    /// Looks up a configured user.
    pub fn user(&self, name: &str) -> Option<&UserAccount> {
        self.users.get(name)
    }

    /// Returns true if the file name is an allow-listed HTTP script.
    pub fn is_script(&self, file_name: &str) -> bool {
        self.scripts.contains(file_name)
    }

    /// Returns true if the file name is an allow-listed redirect.
    pub fn is_redirect(&self, file_name: &str) -> bool {
        self.redirects.contains(file_name)
    }

    /// Returns true if the file name is an allow-listed WebSocket script.
    pub fn is_ws_script(&self, file_name: &str) -> bool {
        self.ws_scripts.contains(file_name)
    }
}

/// A group name doubles as a directory name, so it must be a single plain segment.
fn is_valid_group_name(name: &str) -> bool {
    !name.is_empty()
        && name != WILDCARD_GROUP
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

impl Default for Policy {
    fn default() -> Self {
        Self::from_config(&HostConfig::default())
    }
}
