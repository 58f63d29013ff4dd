//! Core data types for plook.
//!
//! This module provides the fundamental types used throughout plook:
//! - Repository slugs extracted from registry URLs
//! - Version tokens as supplied by callers
//! - Candidate upstream URLs

pub mod candidate;
pub mod slug;
pub mod version;

// Re-export all public types
pub use candidate::CandidateUrl;
pub use slug::RepositorySlug;
pub use version::VersionToken;
