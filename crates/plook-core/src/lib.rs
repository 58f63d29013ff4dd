//! # plook-core
//!
//! Core types and utilities shared across all plook crates.
//!
//! This crate provides:
//! - PlookError enum for unified error handling, and the ResolutionError triple
//!   every failure is normalized to before it reaches the HTTP layer
//! - RepositorySlug, VersionToken and CandidateUrl domain types
//! - Raw-content URL building and request path checks
//! - RequestContext for correlated per-request logging
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (RepositorySlug, VersionToken, etc.)
//! - `error`: Error types and result aliases
//! - `utils`: Pure helper functions
//! - `context`: Per-request observability context

pub mod context;
pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use context::RequestContext;
pub use error::{PlookError, PlookResult, ResolutionError};
pub use types::{CandidateUrl, RepositorySlug, VersionToken};
