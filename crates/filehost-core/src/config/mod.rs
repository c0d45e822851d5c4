//! Application configuration schemas.
//!
//! The configuration is deserialized from an optional TOML file via the
//! `config` crate, overlaid with `FILEHOST__`-prefixed environment
//! variables. Every field has a default so an empty file (or no file)
//! yields a runnable server. Sections that feed the resource router are
//! normalized into a [`Policy`](crate::policy::Policy) snapshot.

pub mod app;
pub mod logging;
pub mod realtime;
pub mod script;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::logging::LoggingConfig;
use self::realtime::WsConfig;
use self::script::ScriptRuntimeConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Site name shown in page titles.
    #[serde(default = "default_name")]
    pub name: String,
    /// Root directory holding one sub-directory per group.
    #[serde(default = "default_files_dir")]
    pub files_dir: String,
    /// Icon served at `/favicon.ico`.
    #[serde(default = "default_favicon")]
    pub favicon: String,
    /// Configured group names, in display order.
    #[serde(default)]
    pub groups: Vec<String>,
    /// File names handled by HTTP scripts.
    #[serde(default)]
    pub scripts: Vec<String>,
    /// File names whose content is a redirect target.
    #[serde(default)]
    pub redirects: Vec<String>,
    /// Username → `[password, group, group, ...]`; a group of `*` grants every group.
    #[serde(default = "default_users")]
    pub users: BTreeMap<String, Vec<String>>,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// WebSocket settings.
    #[serde(default)]
    pub ws: WsConfig,
    /// Script execution settings.
    #[serde(default)]
    pub script_runtime: ScriptRuntimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            files_dir: default_files_dir(),
            favicon: default_favicon(),
            groups: Vec::new(),
            scripts: Vec::new(),
            redirects: Vec::new(),
            users: default_users(),
            server: ServerConfig::default(),
            ws: WsConfig::default(),
            script_runtime: ScriptRuntimeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl HostConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// A missing file is not an error; environment variables prefixed with
    /// `FILEHOST__` override file values (`FILEHOST__SERVER__PORT=9000`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("FILEHOST")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

fn default_name() -> String {
    "FileHost".to_string()
}

fn default_files_dir() -> String {
    "files".to_string()
}

fn default_favicon() -> String {
    "favicon.ico".to_string()
}

fn default_users() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([(
        "admin".to_string(),
        vec!["password".to_string(), "*".to_string()],
    )])
}
