//! Resource routing: classification, listings, and content resolution.

pub mod classifier;
pub mod listing;
pub mod script;
pub mod service;

pub use classifier::{Resource, ResourceKind, classify};
pub use listing::{DirectoryListing, ListingEntry, ListingKind, root_listing};
pub use script::run_script;
pub use service::{ResourceResponse, ResourceService};
