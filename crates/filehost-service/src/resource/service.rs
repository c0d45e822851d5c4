//! Resource service: turns a classified resource into a response.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use filehost_core::error::AppError;
use filehost_core::policy::Policy;
use filehost_core::result::AppResult;
use filehost_core::traits::storage::{EntryKind, FileSystem};
use filehost_plugin::{ScriptRegistry, ScriptRequest, ScriptResponse};

use crate::context::RequestContext;
use crate::pages::{self, BROKEN_SCRIPT_BODY, WS_SCRIPT_BODY};
use crate::resource::classifier::{Resource, ResourceKind, classify};
use crate::resource::listing::{DirectoryListing, root_listing};
use crate::resource::script::run_script;

/// Default content type for files without a known extension.
const OCTET_STREAM: &str = "application/octet-stream";

/// Outcome of serving a resource.
///
/// Failures (forbidden, bad path, not found, read and script errors) are
/// returned as [`AppError`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceResponse {
    /// 200 `text/html`.
    Html(String),
    /// 200 with file content.
    File {
        /// Guessed content type.
        mime_type: String,
        /// File bytes.
        body: Bytes,
    },
    /// 200 script output, served cross-origin.
    Script(ScriptResponse),
    /// 307 to the given location.
    Redirect(String),
}

/// Serves resources under the file root.
#[derive(Clone)]
pub struct ResourceService {
    /// Filesystem access.
    fs: Arc<dyn FileSystem>,
    /// Script handlers.
    scripts: Arc<ScriptRegistry>,
}

impl std::fmt::Debug for ResourceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceService")
            .field("fs", &self.fs)
            .finish()
    }
}

impl ResourceService {
    /// Creates a new resource service.
    pub fn new(fs: Arc<dyn FileSystem>, scripts: Arc<ScriptRegistry>) -> Self {
        Self { fs, scripts }
    }

    /// The script registry.
    pub fn scripts(&self) -> &Arc<ScriptRegistry> {
        &self.scripts
    }

    /// Classifies `url_path` for the caller.
    pub async fn classify(
        &self,
        policy: &Policy,
        ctx: &RequestContext,
        url_path: &str,
    ) -> AppResult<Resource> {
        classify(self.fs.as_ref(), policy, &ctx.groups, url_path).await
    }

    /// Serves `url_path` for the caller.
    pub async fn serve(
        &self,
        policy: &Policy,
        ctx: &RequestContext,
        url_path: &str,
    ) -> AppResult<ResourceResponse> {
        let resource = self.classify(policy, ctx, url_path).await?;
        self.respond(policy, ctx, resource).await
    }

    /// Produces the response for an already classified resource.
    pub async fn respond(
        &self,
        policy: &Policy,
        ctx: &RequestContext,
        resource: Resource,
    ) -> AppResult<ResourceResponse> {
        match resource.kind {
            ResourceKind::NotFound => Err(AppError::not_found(format!(
                "No resource at {}",
                resource.path.site_path()
            ))),
            ResourceKind::Directory => {
                let listing =
                    DirectoryListing::read(self.fs.as_ref(), policy, &resource.path).await?;
                Ok(ResourceResponse::Html(pages::directory_page(
                    &listing.render(),
                )))
            }
            ResourceKind::WsScript => Ok(ResourceResponse::Html(WS_SCRIPT_BODY.to_string())),
            ResourceKind::Redirect => {
                let data = self.fs.read(&resource.fs_path).await?;
                let target = std::str::from_utf8(&data)
                    .map_err(|_| AppError::storage("Redirect target is not valid UTF-8"))?
                    .trim_end()
                    .to_string();
                debug!(path = %resource.path.site_path(), target = %target, "Redirecting");
                Ok(ResourceResponse::Redirect(target))
            }
            ResourceKind::Script => self.run(policy, ctx, &resource).await,
            ResourceKind::PlainFile => {
                let body = self.fs.read(&resource.fs_path).await?;
                let mime_type = mime_guess::from_path(resource.path.file_name())
                    .first_raw()
                    .unwrap_or(OCTET_STREAM)
                    .to_string();
                Ok(ResourceResponse::File { mime_type, body })
            }
        }
    }

    async fn run(
        &self,
        policy: &Policy,
        ctx: &RequestContext,
        resource: &Resource,
    ) -> AppResult<ResourceResponse> {
        let site_path = resource.path.site_path();
        let Some(script) = self
            .scripts
            .http(&site_path, resource.path.file_name())
            .await
        else {
            warn!(path = %site_path, "No handler registered for script");
            return Ok(broken_script());
        };

        let request = ScriptRequest {
            ip: ctx.ip.clone(),
            query: ctx.query.clone(),
            cookies: ctx.cookies.clone(),
        };
        match run_script(script, request, policy.script_timeout).await? {
            Some(response) => {
                info!(path = %site_path, mime = %response.mime_type, "Script served");
                Ok(ResourceResponse::Script(response))
            }
            None => {
                warn!(path = %site_path, "Script produced no output");
                Ok(broken_script())
            }
        }
    }

    /// The site root: every readable group's listing, in group order.
    pub async fn index(&self, policy: &Policy, ctx: &RequestContext) -> String {
        let listings = root_listing(self.fs.as_ref(), policy, &ctx.groups).await;
        pages::index_page(&policy.site_name, &listings)
    }

    /// Reads the configured favicon, or `None` if it does not exist.
    pub async fn favicon(&self, policy: &Policy) -> AppResult<Option<Bytes>> {
        match self.fs.entry_kind(&policy.favicon).await? {
            Some(EntryKind::File) => self.fs.read(&policy.favicon).await.map(Some),
            _ => Ok(None),
        }
    }
}

fn broken_script() -> ResourceResponse {
    ResourceResponse::Script(ScriptResponse::html(BROKEN_SCRIPT_BODY))
}
