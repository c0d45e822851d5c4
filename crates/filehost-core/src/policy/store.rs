//! Process-wide holder of the current policy snapshot.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use super::Policy;

/// Holds the current [`Policy`] and swaps it wholesale on reload.
///
/// Readers take an `Arc` snapshot and never observe a half-applied reload.
#[derive(Debug)]
pub struct PolicyStore {
    current: RwLock<Arc<Policy>>,
}

impl PolicyStore {
    /// Creates a store holding the given policy.
    pub fn new(policy: Policy) -> Self {
        Self {
            current: RwLock::new(Arc::new(policy)),
        }
    }

    /// Returns the current policy snapshot.
    pub fn snapshot(&self) -> Arc<Policy> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the current policy, returning the previous snapshot.
    pub fn replace(&self, policy: Policy) -> Arc<Policy> {
        let next = Arc::new(policy);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, next);
        info!(
            groups = guard.groups.len(),
            users = guard.users.len(),
            "Access policy replaced"
        );
        previous
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostConfig;

    #[test]
    fn test_snapshot_survives_replace() {
        let store = PolicyStore::new(Policy::from_config(
            &HostConfig::from_toml(r#"groups = ["old"]"#).unwrap(),
        ));
        let before = store.snapshot();

        let previous = store.replace(Policy::from_config(
            &HostConfig::from_toml(r#"groups = ["new"]"#).unwrap(),
        ));

        assert_eq!(before.groups[0].as_str(), "old");
        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(store.snapshot().groups[0].as_str(), "new");
    }
}
