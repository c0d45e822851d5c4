//! Script execution settings.

use serde::{Deserialize, Serialize};

/// Limits applied to HTTP script invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptRuntimeConfig {
    /// Seconds a script may run before the request fails with a 500.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ScriptRuntimeConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
