//! Bower registry backend.
//!
//! The Bower registry only maps names to git endpoints. Versions are the
//! repository's tags, listed through the GitHub REST API and reported the way
//! `bower info` does: semver-valid tags with any leading `v` removed.
//!
//! Endpoints resolved by either operation are remembered, so listing versions
//! of a package already looked up goes straight to GitHub.

use std::sync::Arc;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use plook_core::error::PlookError;
use plook_core::types::RepositorySlug;
use crate::api::{BowerPackage, GitHubTag, PackageInfo, PackageLookup};
use crate::cache::SlugCache;
use crate::client::{build_http_client, encode_package_name, AuthConfig, ClientConfig};
use crate::versions::order_newest_first;
use crate::{PackageRegistry, RegistryResult};

/// Default Bower registry endpoint
pub const DEFAULT_BOWER_REGISTRY: &str = "https://registry.bower.io";

/// Default GitHub REST API endpoint
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Tags requested per page from the GitHub API
const TAGS_PER_PAGE: u32 = 100;

/// Bower registry backend
#[derive(Debug, Clone)]
pub struct BowerRegistry {
    /// Client for the Bower registry (never authenticated)
    registry_client: Client,
    /// Client for the GitHub API, carries the token if one is configured
    github_client: Client,
    base_url: String,
    github_api_url: String,
    /// GitHub repositories of registry entries seen so far
    endpoints: Arc<SlugCache>,
}

impl BowerRegistry {
    /// Create a client for the public Bower registry and GitHub API
    pub fn new() -> RegistryResult<Self> {
        Self::with_config(
            DEFAULT_BOWER_REGISTRY,
            DEFAULT_GITHUB_API,
            &ClientConfig::default(),
            &AuthConfig::default(),
        )
    }

    /// Create a client against custom endpoints
    pub fn with_config(
        base_url: &str,
        github_api_url: &str,
        config: &ClientConfig,
        github_auth: &AuthConfig,
    ) -> RegistryResult<Self> {
        Ok(Self {
            registry_client: build_http_client(config, &AuthConfig::default())?,
            github_client: build_http_client(config, github_auth)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            github_api_url: github_api_url.trim_end_matches('/').to_string(),
            endpoints: Arc::new(SlugCache::new()),
        })
    }

    /// Fetch the registry entry, `None` when the registry answers 404
    pub async fn fetch_package(&self, name: &str) -> RegistryResult<Option<BowerPackage>> {
        let Some(segment) = encode_package_name(name) else {
            return Ok(None);
        };
        let url = format!("{}/packages/{}", self.base_url, segment);
        debug!("Fetching bower package from {}", url);

        let response = self.registry_client
            .get(&url)
            .send()
            .await
            .map_err(|e| PlookError::registry(format!("Failed to fetch package: {}", e), e))?;

        match response.status() {
            StatusCode::OK => {
                let package = response.json::<BowerPackage>()
                    .await
                    .map_err(|e| PlookError::registry(format!("Failed to parse package: {}", e), e))?;
                Ok(Some(package))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(PlookError::Registry {
                message: format!("Registry returned status {}: {}", status, name),
                source: None,
            }),
        }
    }

    /// List tag names of a GitHub repository.
    // TODO: follow the Link header for repositories with more than 100 tags
    pub async fn fetch_tags(&self, slug: &RepositorySlug) -> RegistryResult<Vec<String>> {
        let url = format!(
            "{}/repos/{}/{}/tags?per_page={}",
            self.github_api_url,
            slug.owner(),
            slug.repo(),
            TAGS_PER_PAGE
        );
        debug!("Fetching tags from {}", url);

        let response = self.github_client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| PlookError::registry(format!("Failed to fetch tags: {}", e), e))?;

        if !response.status().is_success() {
            return Err(PlookError::Registry {
                message: format!("GitHub returned status {} listing tags of {}", response.status(), slug),
                source: None,
            });
        }

        let tags = response.json::<Vec<GitHubTag>>()
            .await
            .map_err(|e| PlookError::registry(format!("Failed to parse tags: {}", e), e))?;

        Ok(tags.into_iter().map(|tag| tag.name).collect())
    }

    /// Repository slug of a registry entry, from memory when possible
    async fn endpoint(&self, name: &str) -> RegistryResult<Option<RepositorySlug>> {
        if let Some(slug) = self.endpoints.get(name) {
            return Ok(Some(slug));
        }

        let Some(package) = self.fetch_package(name).await? else {
            return Ok(None);
        };
        Ok(self.remember(name, &package.url))
    }

    fn remember(&self, name: &str, url: &str) -> Option<RepositorySlug> {
        let slug = RepositorySlug::from_repository_url(url)?;
        self.endpoints.insert(name.to_string(), slug.clone());
        Some(slug)
    }
}

#[async_trait]
impl PackageRegistry for BowerRegistry {
    async fn lookup(&self, name: &str) -> RegistryResult<Option<PackageLookup>> {
        let package = self.fetch_package(name).await?;
        Ok(package.map(|package| {
            self.remember(name, &package.url);
            PackageLookup {
                name: package.name,
                url: package.url,
            }
        }))
    }

    async fn info(&self, name: &str) -> RegistryResult<PackageInfo> {
        let slug = self.endpoint(name).await?
            .ok_or_else(|| PlookError::PackageNotFound { name: name.to_string() })?;
        let tags = self.fetch_tags(&slug).await?;

        Ok(PackageInfo {
            name: name.to_string(),
            versions: versions_from_tags(tags),
        })
    }
}

/// Keep semver-valid tags, strip a leading `v`, newest first
fn versions_from_tags(tags: Vec<String>) -> Vec<String> {
    let versions = tags.into_iter().filter_map(|tag| {
        let version = tag.strip_prefix('v').unwrap_or(&tag);
        semver::Version::parse(version).ok().map(|_| version.to_string())
    });

    order_newest_first(versions, None)
}
