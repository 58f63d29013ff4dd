//! Utility functions and helpers.
//!
//! Pure functionality used across multiple plook crates.

pub mod path;
pub mod url;

// Re-export commonly used utilities
pub use path::{is_safe_file_path, split_request_path};
pub use url::{raw_content_url, DEFAULT_RAW_HOST};
