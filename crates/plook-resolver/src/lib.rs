//! Package resolution and upstream racing for plook
//!
//! This crate turns a `(package, version, file)` request into an upstream
//! response: the package resolver finds the repository slug and the concrete
//! version, the candidate racer fetches both tag spellings concurrently, and
//! [`Plook`] chains the stages into one pipeline.

pub mod package;
pub mod pipeline;
pub mod race;
pub mod racer;

// Re-export main types
pub use package::PackageResolver;
pub use pipeline::{FileRequest, Plook};
pub use race::first_ok;
pub use racer::{CandidateRacer, ConditionalHeaders, RacerConfig, UpstreamResult};

use plook_core::error::PlookError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, PlookError>;

#[cfg(test)]
pub(crate) mod test_support;
