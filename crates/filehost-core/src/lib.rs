//! # filehost-core
//!
//! Core crate for FileHost. Contains the configuration schema, the
//! reloadable policy store, typed group identifiers, the filesystem trait
//! used by the resource router, and the unified error system.
//!
//! This crate has **no** internal dependencies on other FileHost crates.

pub mod config;
pub mod error;
pub mod policy;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use policy::{Policy, PolicyStore};
pub use result::AppResult;
