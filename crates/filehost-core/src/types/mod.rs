//! Core type definitions used across the FileHost workspace.

pub mod credentials;
pub mod group;

pub use credentials::Credentials;
pub use group::{ALL_GROUP, GroupName, GroupSet, WILDCARD_GROUP};
