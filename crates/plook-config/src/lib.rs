//! Configuration parsing for the plook server
//!
//! This crate handles parsing and validation of plook.toml, and layers the
//! global file, the project file, environment variables and CLI flags into
//! one effective configuration.

pub mod toml;
pub mod merge;

// Re-export main types
pub use self::toml::{PlookToml, ServerSection, RegistrySection, RegistryKind, UpstreamSection, CacheSection};
pub use self::merge::{ConfigLoader, ConfigLayering, ConfigSource};

use plook_core::error::PlookError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, PlookError>;
