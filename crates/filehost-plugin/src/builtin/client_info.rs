//! `info.js`: reports what the server sees of the caller.

use async_trait::async_trait;
use serde::Serialize;

use filehost_core::result::AppResult;

use crate::traits::{HttpScript, ScriptRequest, ScriptResponse};

/// HTTP script answering with the caller's address, query and cookie names.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClientInfo;

#[derive(Debug, Serialize)]
struct ClientInfoBody<'a> {
    ip: &'a str,
    query: &'a std::collections::HashMap<String, String>,
    cookies: Vec<&'a str>,
}

#[async_trait]
impl HttpScript for ClientInfo {
    async fn call(&self, request: ScriptRequest) -> AppResult<Option<ScriptResponse>> {
        // Cookie values carry the password, only names are echoed.
        let mut cookies: Vec<&str> = request.cookies.keys().map(String::as_str).collect();
        cookies.sort_unstable();

        let body = ClientInfoBody {
            ip: &request.ip,
            query: &request.query,
            cookies,
        };
        ScriptResponse::json(&body).map(Some)
    }
}
