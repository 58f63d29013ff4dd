//! Package registry clients for plook
//!
//! This crate provides the two registry operations plook consumes: looking a
//! package up to find its repository URL, and listing its published versions.
//! Both npm and Bower registries are supported behind [`PackageRegistry`], and
//! resolved repository slugs are memoized in a bounded [`SlugCache`].

pub mod api;
pub mod bower;
pub mod cache;
pub mod client;
pub mod versions;

// Re-export main types
pub use api::{PackageInfo, PackageLookup};
pub use bower::BowerRegistry;
pub use cache::{CacheStats, SlugCache};
pub use client::{AuthConfig, ClientConfig, NpmRegistry};

use async_trait::async_trait;
use plook_core::error::PlookError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, PlookError>;

/// A package registry consulted as a black box
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Find the repository URL of a package, `None` if the registry does not know it
    async fn lookup(&self, name: &str) -> RegistryResult<Option<PackageLookup>>;

    /// List the published versions of a package, newest first
    async fn info(&self, name: &str) -> RegistryResult<PackageInfo>;
}
