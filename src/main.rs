//! FileHost Server: group-gated personal file hosting
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use filehost_api::{AppState, build_app};
use filehost_core::config::HostConfig;
use filehost_core::config::logging::LoggingConfig;
use filehost_core::error::AppError;
use filehost_core::policy::{Policy, PolicyStore};
use filehost_core::traits::storage::FileSystem;
use filehost_plugin::{ScriptRegistry, register_builtin};
use filehost_realtime::ConnectionManager;
use filehost_storage::LocalFileSystem;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "filehost-server", version, about = "Group-gated personal file host")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "FILEHOST_CONFIG", default_value = "config/filehost.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match HostConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);
    tracing::info!(path = %cli.config.display(), "Configuration loaded");

    if let Err(e) = run(config, cli.config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: HostConfig, config_path: PathBuf) -> Result<(), AppError> {
    tracing::info!("Starting FileHost v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Policy snapshot ──────────────────────────────────
    let policy = Policy::from_config(&config);
    if !policy.files_root.is_dir() {
        tracing::warn!(
            files_dir = %policy.files_root.display(),
            "Files directory does not exist; every resource will be not found"
        );
    }
    let policies = Arc::new(PolicyStore::new(policy));

    // ── Step 2: Scripts ──────────────────────────────────────────
    let scripts = Arc::new(ScriptRegistry::new());
    register_builtin(&scripts).await?;
    tracing::info!(count = scripts.list().await.len(), "Scripts registered");

    // ── Step 3: Filesystem + realtime ────────────────────────────
    let fs: Arc<dyn FileSystem> = Arc::new(LocalFileSystem::new());
    let realtime = Arc::new(ConnectionManager::new(config.ws.outbound_buffer));

    // ── Step 4: Reload on SIGHUP, connection dump on SIGUSR1 ─────
    spawn_reload_listener(config_path, Arc::clone(&policies));
    spawn_connection_dump_listener(Arc::clone(&realtime));

    // ── Step 5: Build and start HTTP server ──────────────────────
    let state = AppState::new(policies, fs, scripts, Arc::clone(&realtime));
    let app = build_app(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("FileHost server listening on {}", addr);

    // ── Step 6: Graceful shutdown ────────────────────────────────
    let shutdown_realtime = Arc::clone(&realtime);
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        shutdown_realtime.close_all();
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 7: Wait for WebSocket sessions to unregister ───────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let drained = tokio::time::timeout(grace, async {
        while realtime.connection_count() > 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    if drained.is_err() {
        tracing::warn!(
            remaining = realtime.connection_count(),
            "WebSocket connections still open after grace period"
        );
    }

    tracing::info!("FileHost server shut down gracefully");
    Ok(())
}

/// Re-reads the configuration on SIGHUP and swaps the policy snapshot.
///
/// A failed reload keeps the current snapshot. Server, WebSocket buffer and
/// logging settings only apply at startup.
#[cfg(unix)]
fn spawn_reload_listener(config_path: PathBuf, policies: Arc<PolicyStore>) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGHUP handler; reload disabled");
            return;
        }
    };

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            reload(&config_path, &policies);
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_listener(_config_path: PathBuf, _policies: Arc<PolicyStore>) {
    tracing::debug!("Configuration reload is only available on Unix");
}

/// Logs every live WebSocket connection on SIGUSR1.
#[cfg(unix)]
fn spawn_connection_dump_listener(realtime: Arc<ConnectionManager>) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut user1 = match signal(SignalKind::user_defined1()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGUSR1 handler; connection dump disabled");
            return;
        }
    };

    tokio::spawn(async move {
        while user1.recv().await.is_some() {
            log_connections(&realtime);
        }
    });
}

#[cfg(not(unix))]
fn spawn_connection_dump_listener(_realtime: Arc<ConnectionManager>) {}

fn log_connections(realtime: &ConnectionManager) {
    let connections = realtime.list();
    tracing::info!(count = connections.len(), "Live WebSocket connections");
    for conn in connections {
        tracing::info!(
            conn_id = %conn.id,
            ip = %conn.ip,
            path = %conn.path,
            connected_at = %conn.connected_at,
            "WebSocket connection"
        );
    }
}

fn reload(config_path: &Path, policies: &PolicyStore) {
    tracing::info!(path = %config_path.display(), "Reloading configuration");
    match HostConfig::load(config_path) {
        Ok(config) => {
            policies.replace(Policy::from_config(&config));
        }
        Err(e) => {
            tracing::error!(error = %e, "Reload failed, keeping current configuration");
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
