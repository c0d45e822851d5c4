//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use http::{HeaderMap, Request, StatusCode};
use tempfile::TempDir;
use tower::ServiceExt;

use filehost_api::{AppState, build_app};
use filehost_core::config::HostConfig;
use filehost_core::policy::{Policy, PolicyStore};
use filehost_core::traits::storage::FileSystem;
use filehost_plugin::{FnScript, ScriptRegistry, ScriptRequest, register_builtin};
use filehost_realtime::ConnectionManager;
use filehost_storage::LocalFileSystem;

/// Configuration shared by every test; `files_dir` is filled in per test.
pub const TEST_CONFIG: &str = r#"
name = "Test Host"
groups = ["private", "personal", "solly", "linky"]
scripts = ["info.js", "empty.js"]
redirects = ["site.url", "bad.url"]

[users]
admin = ["password", "*"]
solly = ["pw", "private", "solly"]

[ws]
enabled = true
scripts = ["echo.js", "chat.js"]
"#;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Policy holder, for reload tests
    pub policies: Arc<PolicyStore>,
    /// Live WebSocket connections
    pub realtime: Arc<ConnectionManager>,
    /// Temporary file root; removed on drop
    pub root: TempDir,
}

impl TestApp {
    /// Create a new test application over a populated file root
    pub async fn new() -> Self {
        Self::with_fs(Arc::new(LocalFileSystem::new())).await
    }

    /// Like [`TestApp::new`], reading files through `fs`
    pub async fn with_fs(fs: Arc<dyn FileSystem>) -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        populate(root.path());

        let policies = Arc::new(PolicyStore::new(test_policy(root.path(), TEST_CONFIG)));

        let scripts = Arc::new(ScriptRegistry::new());
        register_builtin(&scripts)
            .await
            .expect("Failed to register built-in scripts");
        scripts
            .register_http(
                "empty.js",
                Arc::new(FnScript::new("empty", |_req: ScriptRequest| async move {
                    Ok(None)
                })),
            )
            .await
            .expect("Failed to register script");

        let realtime = Arc::new(ConnectionManager::new(16));
        let state = AppState::new(
            Arc::clone(&policies),
            fs,
            scripts,
            Arc::clone(&realtime),
        );

        Self {
            router: build_app(state),
            policies,
            realtime,
            root,
        }
    }

    /// Serves the app on an ephemeral port with connect info
    pub async fn spawn(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("No local addr");
        let app = self
            .router
            .clone()
            .into_make_service_with_connect_info::<SocketAddr>();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });
        addr
    }

    /// Swaps in a policy built from `toml`, as a reload would
    pub fn reload(&self, toml: &str) {
        self.policies.replace(test_policy(self.root.path(), toml));
    }

    /// Make a GET request with an optional `Cookie` header
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        let mut req = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            req = req.header("Cookie", cookie);
        }
        self.send(req.body(Body::empty()).expect("Failed to build request"))
            .await
    }

    /// Send a prepared request to the test app
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub body: Bytes,
}

impl TestResponse {
    /// Body as UTF-8 text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// A header value as text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

fn test_policy(root: &Path, toml: &str) -> Policy {
    let mut config = HostConfig::from_toml(toml).expect("Failed to parse test config");
    config.files_dir = root.display().to_string();
    config.favicon = root.join("favicon.ico").display().to_string();
    Policy::from_config(&config)
}

fn populate(root: &Path) {
    let files = [
        ("all/pub.txt", "public"),
        ("all/a b.txt", "spaced"),
        ("all/info.js", ""),
        ("all/empty.js", ""),
        ("all/echo.js", ""),
        ("all/chat.js", ""),
        ("all/site.url", "https://example.com\n"),
        ("private/doc.txt", "private doc"),
        ("linky/secret.txt", "linky secret"),
    ];
    for (relative, contents) in files {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().expect("No parent")).expect("Failed to create dir");
        std::fs::write(path, contents).expect("Failed to write file");
    }
    std::fs::create_dir_all(root.join("solly")).expect("Failed to create dir");
    std::fs::write(root.join("all/bad.url"), [0xff, 0xfe, b'\n']).expect("Failed to write file");
}
