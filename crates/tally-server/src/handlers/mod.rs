//! HTTP request handlers
//!
//! One submodule per API area.

pub mod ingest;

// Re-export all handlers for use in router
pub use ingest::*;
