//! Package resolution: name → repository slug, token → concrete version

use std::sync::Arc;
use tracing::{debug, warn};

use plook_core::error::PlookError;
use plook_core::types::{RepositorySlug, VersionToken};
use plook_registry::{PackageRegistry, SlugCache};
use crate::ResolverResult;

/// Resolves packages against a registry, memoizing slugs
#[derive(Clone)]
pub struct PackageResolver {
    registry: Arc<dyn PackageRegistry>,
    cache: Arc<SlugCache>,
}

impl PackageResolver {
    /// Create a resolver with a default-sized slug cache
    pub fn new(registry: Arc<dyn PackageRegistry>) -> Self {
        Self::with_cache(registry, Arc::new(SlugCache::new()))
    }

    /// Create a resolver sharing an existing slug cache
    pub fn with_cache(registry: Arc<dyn PackageRegistry>, cache: Arc<SlugCache>) -> Self {
        Self { registry, cache }
    }

    /// Slug cache backing this resolver
    pub fn cache(&self) -> &SlugCache {
        &self.cache
    }

    /// Find the repository slug of a package.
    ///
    /// Answers from the cache when possible. A registry miss is `PackageNotFound`,
    /// a repository URL outside GitHub is `UnsupportedRepository`. Only
    /// successful resolutions are cached.
    pub async fn resolve_slug(&self, name: &str) -> ResolverResult<RepositorySlug> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlookError::MissingPackageName);
        }

        if let Some(slug) = self.cache.get(name) {
            debug!("Slug cache hit for '{}': {}", name, slug);
            return Ok(slug);
        }

        let lookup = match self.registry.lookup(name).await {
            Ok(Some(lookup)) => lookup,
            Ok(None) => return Err(PlookError::PackageNotFound { name: name.to_string() }),
            Err(e) => {
                warn!("Registry lookup for '{}' failed: {}", name, e);
                return Err(PlookError::PackageNotFound { name: name.to_string() });
            }
        };

        let slug = RepositorySlug::from_repository_url(&lookup.url)
            .ok_or_else(|| PlookError::UnsupportedRepository {
                name: name.to_string(),
                url: lookup.url.clone(),
            })?;

        debug!("Resolved '{}' to {}", name, slug);
        self.cache.insert(name.to_string(), slug.clone());
        Ok(slug)
    }

    /// Turn a version token into a version the registry has published.
    ///
    /// `latest` picks the first (newest) entry of the registry list; any other
    /// token must appear in the list verbatim.
    pub async fn resolve_version(&self, name: &str, token: &VersionToken) -> ResolverResult<String> {
        let name = name.trim();

        let info = match self.registry.info(name).await {
            Ok(info) => info,
            Err(PlookError::PackageNotFound { name }) => {
                return Err(PlookError::PackageNotFound { name });
            }
            Err(e) => {
                warn!("Registry info for '{}' failed: {}", name, e);
                return Err(PlookError::PackageNotFound { name: name.to_string() });
            }
        };

        match token.select(&info.versions) {
            Some(version) => {
                debug!("Resolved '{}@{}' to {}", name, token, version);
                Ok(version.to_string())
            }
            None if token.is_latest() => Err(PlookError::NoVersions { name: name.to_string() }),
            None => Err(PlookError::VersionNotFound {
                name: name.to_string(),
                version: token.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for PackageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageResolver")
            .field("cache", &self.cache.stats())
            .finish_non_exhaustive()
    }
}
