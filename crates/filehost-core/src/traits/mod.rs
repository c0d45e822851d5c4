//! Core traits defined in `filehost-core` and implemented by other crates.

pub mod storage;

pub use storage::{DirEntry, EntryKind, FileSystem};
