//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! module and tag handlers.

pub mod cache;
pub mod query;
pub mod response;

// Re-export commonly used types
pub use cache::CachePolicy;
pub use query::{percent_decode, query_param};
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_bytes_response, build_error_response, build_health_response, build_json_response,
    build_options_response,
};
