//! `Caller` extractor: resolves cookies into groups against one policy snapshot.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use filehost_core::policy::Policy;
use filehost_core::types::Credentials;
use filehost_service::RequestContext;

use crate::extractors::client_ip::ClientIp;
use crate::state::AppState;

/// The caller of a request, as seen by one policy snapshot.
///
/// Bad or missing credentials never reject a request; they resolve to the
/// anonymous group set.
#[derive(Debug, Clone)]
pub struct Caller {
    /// Snapshot every decision of this request is made against.
    pub policy: Arc<Policy>,
    /// Address, inputs and effective groups.
    pub ctx: RequestContext,
}

impl std::ops::Deref for Caller {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ClientIp(ip) = ClientIp::from_extensions(&parts.extensions);

        let cookies: HashMap<String, String> = CookieJar::from_headers(&parts.headers)
            .iter()
            .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
            .collect();

        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(query)| query)
            .unwrap_or_default();

        let policy = state.policies.snapshot();
        let resolution = state
            .resolver
            .resolve_detailed(&policy, &Credentials::from_cookies(&cookies));

        debug!(
            ip = %ip,
            source = ?resolution.source,
            groups = resolution.groups.len(),
            "Caller resolved"
        );

        Ok(Self {
            ctx: RequestContext::new(ip, query, cookies, resolution.groups),
            policy,
        })
    }
}
