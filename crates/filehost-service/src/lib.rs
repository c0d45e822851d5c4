//! # filehost-service
//!
//! The access-controlled resource router. Given a request context (caller
//! address, query, cookies, effective groups) and a URL path it:
//!
//! 1. checks the group selector against the caller's groups,
//! 2. classifies the target (directory, script, redirect, ws-script, file),
//! 3. produces a [`ResourceResponse`].
//!
//! All filesystem access goes through the injected
//! [`FileSystem`](filehost_core::traits::FileSystem).

pub mod context;
pub mod pages;
pub mod resource;

pub use context::RequestContext;
pub use resource::{Resource, ResourceKind, ResourceResponse, ResourceService};
