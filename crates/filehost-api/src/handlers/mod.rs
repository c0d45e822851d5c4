//! Route handlers.

pub mod pages;
pub mod resource;
pub mod ws;
