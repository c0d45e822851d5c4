//! # filehost-auth
//!
//! Resolves the `u`/`p` cookie credentials of a request into the ordered
//! set of groups the request may read. Bad credentials never fail a
//! request; they degrade to anonymous (`all`-only) access.

pub mod resolver;

pub use resolver::{GroupResolution, GroupResolver, GroupSource};
