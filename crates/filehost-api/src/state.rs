//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use filehost_auth::GroupResolver;
use filehost_core::policy::PolicyStore;
use filehost_core::traits::storage::FileSystem;
use filehost_plugin::ScriptRegistry;
use filehost_realtime::ConnectionManager;
use filehost_service::ResourceService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Current policy snapshot holder; swapped on reload.
    pub policies: Arc<PolicyStore>,
    /// Credential → group resolution.
    pub resolver: GroupResolver,
    /// Resource router.
    pub resources: ResourceService,
    /// Live WebSocket connections.
    pub realtime: Arc<ConnectionManager>,
}

impl AppState {
    /// Wires the state from its collaborators.
    pub fn new(
        policies: Arc<PolicyStore>,
        fs: Arc<dyn FileSystem>,
        scripts: Arc<ScriptRegistry>,
        realtime: Arc<ConnectionManager>,
    ) -> Self {
        Self {
            policies,
            resolver: GroupResolver::new(),
            resources: ResourceService::new(fs, scripts),
            realtime,
        }
    }
}
