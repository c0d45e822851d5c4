//! Request context carrying the caller's address, inputs and resolved groups.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use filehost_core::types::GroupSet;

/// Context for the current request.
///
/// Built by the HTTP layer and passed into service methods so that every
/// operation knows *which* groups the caller holds.
#[derive(Clone)]
pub struct RequestContext {
    /// Remote address of the caller.
    pub ip: String,
    /// Parsed query string.
    pub query: HashMap<String, String>,
    /// Parsed cookies; contains the plaintext password.
    pub cookies: HashMap<String, String>,
    /// Effective group set.
    pub groups: GroupSet,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        ip: String,
        query: HashMap<String, String>,
        cookies: HashMap<String, String>,
        groups: GroupSet,
    ) -> Self {
        Self {
            ip,
            query,
            cookies,
            groups,
            request_time: Utc::now(),
        }
    }

    /// An anonymous context with no inputs, for internal callers and tests.
    pub fn anonymous(ip: impl Into<String>) -> Self {
        Self::new(ip.into(), HashMap::new(), HashMap::new(), GroupSet::anonymous())
    }
}

// Cookie values are left out: they carry the password.
impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("ip", &self.ip)
            .field("query", &self.query)
            .field("cookies", &self.cookies.keys().collect::<Vec<_>>())
            .field("groups", &self.groups)
            .field("request_time", &self.request_time)
            .finish()
    }
}
