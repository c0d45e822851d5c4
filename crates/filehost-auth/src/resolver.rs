//! Effective group resolver.
//!
//! Resolution order:
//! 1. No username cookie: anonymous.
//! 2. Unknown username: anonymous.
//! 3. Password mismatch (exact, plaintext): anonymous.
//! 4. Otherwise the user's granted groups, `*` expanded to every configured
//!    group, followed by `all`.

use filehost_core::policy::{GroupGrant, Policy};
use filehost_core::types::{Credentials, GroupSet};
use tracing::debug;

/// Where a resolved group set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSource {
    /// No username was sent.
    Anonymous,
    /// The username is not configured.
    UnknownUser,
    /// The password did not match.
    BadPassword,
    /// Credentials matched a configured user.
    User,
}

/// Result of resolving credentials.
#[derive(Debug, Clone)]
pub struct GroupResolution {
    /// Groups the request may read.
    pub groups: GroupSet,
    /// Why these groups were granted.
    pub source: GroupSource,
}

/// Maps request credentials to an effective group set.
///
/// Stateless; the policy snapshot is passed per call so a reload between
/// requests is picked up without rebuilding the resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupResolver;

impl GroupResolver {
    /// Creates a new resolver.
    pub fn new() -> Self {
        Self
    }

    /// Resolves credentials to the effective group set.
    pub fn resolve(&self, policy: &Policy, credentials: &Credentials) -> GroupSet {
        self.resolve_detailed(policy, credentials).groups
    }

    /// Resolves credentials and reports why the result was chosen.
    pub fn resolve_detailed(&self, policy: &Policy, credentials: &Credentials) -> GroupResolution {
        let Some(username) = credentials.username.as_deref() else {
            return anonymous(GroupSource::Anonymous);
        };

        let Some(account) = policy.user(username) else {
            debug!(user = %username, "Unknown user, treating as anonymous");
            return anonymous(GroupSource::UnknownUser);
        };

        if credentials.password.as_deref() != Some(account.password.as_str()) {
            debug!(user = %username, "Password mismatch, treating as anonymous");
            return anonymous(GroupSource::BadPassword);
        }

        let groups = match &account.grant {
            GroupGrant::Everything => GroupSet::from_granted(policy.groups.iter().cloned()),
            GroupGrant::Groups(groups) => GroupSet::from_granted(groups.iter().cloned()),
        };

        GroupResolution {
            groups,
            source: GroupSource::User,
        }
    }
}

fn anonymous(source: GroupSource) -> GroupResolution {
    GroupResolution {
        groups: GroupSet::anonymous(),
        source,
    }
}
