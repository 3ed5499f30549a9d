//! Request handler module
//!
//! Responsible for request routing dispatch and the module asset and tag
//! endpoints.

pub mod assets;
pub mod router;
pub mod tags;

// Re-export main entry point
pub use router::handle_request;
