//! # filehost-storage
//!
//! Filesystem access for FileHost:
//!
//! - [`LocalFileSystem`], the tokio-backed [`FileSystem`](filehost_core::traits::FileSystem)
//! - [`ResourcePath`], which turns a URL path into a typed group selector
//!   plus validated segments that cannot climb out of the file root

pub mod path;
pub mod providers;

pub use path::{ResourcePath, ensure_contained, group_selector};
pub use providers::local::LocalFileSystem;
