//! Integration tests for group-gated resource serving.

mod helpers;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use http::{Request, StatusCode};
use tower::ServiceExt;

use filehost_core::result::AppResult;
use filehost_core::traits::storage::{DirEntry, EntryKind, FileSystem};
use filehost_storage::LocalFileSystem;

const SOLLY: &str = "u=solly; p=pw";
const ADMIN: &str = "u=admin; p=password";

#[tokio::test]
async fn test_public_file() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/all/pub.txt", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "public");
    assert!(response.header("content-type").unwrap().starts_with("text/plain"));
}

#[tokio::test]
async fn test_percent_encoded_name() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/all/a%20b.txt", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "spaced");
}

#[tokio::test]
async fn test_private_file_requires_group() {
    let app = helpers::TestApp::new().await;

    let anonymous = app.get("/private/doc.txt", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert!(anonymous.text().starts_with("Lacking permission"));

    let granted = app.get("/private/doc.txt", Some(SOLLY)).await;
    assert_eq!(granted.status, StatusCode::OK);
    assert_eq!(granted.text(), "private doc");

    let other = app.get("/linky/secret.txt", Some(SOLLY)).await;
    assert_eq!(other.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_group_match_is_case_insensitive() {
    let app = helpers::TestApp::new().await;

    let anonymous = app.get("/PRIVATE/doc.txt", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_password_is_anonymous() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/private/doc.txt", Some("u=solly; p=nope")).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wildcard_user_reads_every_group() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/linky/secret.txt", Some(ADMIN)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "linky secret");
}

#[tokio::test]
async fn test_missing_file() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/all/missing.txt", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.text().starts_with("Cannot find file"));
}

#[tokio::test]
async fn test_traversal_is_rejected() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/all/%2e%2e/private/doc.txt", None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.text().starts_with("Bad path"));
}

/// Local disk, except that every file is deleted right before it is read.
#[derive(Debug)]
struct VanishingFs(LocalFileSystem);

#[async_trait]
impl FileSystem for VanishingFs {
    async fn entry_kind(&self, path: &Path) -> AppResult<Option<EntryKind>> {
        self.0.entry_kind(path).await
    }

    async fn canonicalize(&self, path: &Path) -> AppResult<PathBuf> {
        self.0.canonicalize(path).await
    }

    async fn read(&self, path: &Path) -> AppResult<Bytes> {
        let _ = std::fs::remove_file(path);
        self.0.read(path).await
    }

    async fn read_dir(&self, path: &Path) -> AppResult<Vec<DirEntry>> {
        self.0.read_dir(path).await
    }
}

#[tokio::test]
async fn test_read_failure_is_server_error() {
    let app = helpers::TestApp::with_fs(Arc::new(VanishingFs(LocalFileSystem::new()))).await;

    for path in ["/all/pub.txt", "/all/site.url"] {
        let response = app.get(path, None).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        let body = response.text();
        assert!(body.starts_with("Error "), "{path}: {body}");
        assert!(body.ends_with("<br><a href='/'>Back</a>"));
        assert!(body.len() > "Error <br><a href='/'>Back</a>".len());
    }
}

#[tokio::test]
async fn test_redirect_with_invalid_target_is_server_error() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/all/bad.url", None).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().starts_with("Error Redirect target is not valid UTF-8"));
}

#[tokio::test]
async fn test_redirect() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/all/site.url", None).await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), Some("https://example.com"));
}

#[tokio::test]
async fn test_script_response() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/all/info.js?x=1", Some(SOLLY)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["ip"], "unknown");
    assert_eq!(body["query"]["x"], "1");
    assert_eq!(body["cookies"], serde_json::json!(["p", "u"]));
    assert!(!response.text().contains("pw"));
}

#[tokio::test]
async fn test_script_without_output() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/all/empty.js", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    assert!(response.text().contains("Broken script"));
}

#[tokio::test]
async fn test_ws_script_over_http() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/all/echo.js", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("Cannot read ws script"));
}

#[tokio::test]
async fn test_directory_listing() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/all", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.text();
    assert!(body.starts_with("<!DOCTYPE html>"));
    assert!(body.contains(r#"<a href="/all/pub.txt">pub.txt</a>"#));
    assert!(!body.contains("echo.js"));
}

#[tokio::test]
async fn test_index_lists_granted_groups_in_order() {
    let app = helpers::TestApp::new().await;

    let body = app.get("/", Some(SOLLY)).await.text();

    let private = body.find("/private:<br>").unwrap();
    let solly = body.find("/solly:<br>").unwrap();
    let all = body.find("/all:<br>").unwrap();
    assert!(private < solly && solly < all);
    assert!(body.contains("There's nothing here!"));
    assert!(!body.contains("/linky:"));
    assert!(body.contains("Logout"));

    let anonymous = app.get("/index.html", None).await.text();
    assert!(anonymous.contains("/all:<br>"));
    assert!(!anonymous.contains("/private:"));
    assert!(anonymous.contains("Login"));
}

#[tokio::test]
async fn test_login_page() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/login.html", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("Test Host"));
    assert!(response.text().contains("encodeURIComponent"));
}

#[tokio::test]
async fn test_missing_favicon() {
    let app = helpers::TestApp::new().await;

    let response = app.get("/favicon.ico", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_favicon() {
    let app = helpers::TestApp::new().await;
    std::fs::write(app.root.path().join("favicon.ico"), [0u8, 0, 1, 0]).unwrap();

    let response = app.get("/favicon.ico", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("image/x-icon"));
    assert_eq!(&response.body[..], &[0u8, 0, 1, 0]);
}

#[tokio::test]
async fn test_reload_revokes_access() {
    let app = helpers::TestApp::new().await;
    assert_eq!(
        app.get("/private/doc.txt", Some(SOLLY)).await.status,
        StatusCode::OK
    );

    app.reload(&helpers::TEST_CONFIG.replace(r#"solly = ["pw", "private", "solly"]"#, ""));

    let response = app.get("/private/doc.txt", Some(SOLLY)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejected_upgrade_never_completes() {
    let app = helpers::TestApp::new().await;

    let req = Request::builder()
        .method("GET")
        .uri("/private/doc.txt")
        .header("connection", "upgrade")
        .header("upgrade", "websocket")
        .header("sec-websocket-version", "13")
        .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(req).await.unwrap();

    assert_eq!(response.headers()["connection"], "close");
    assert!(axum::body::to_bytes(response.into_body(), 1024).await.is_err());
}
