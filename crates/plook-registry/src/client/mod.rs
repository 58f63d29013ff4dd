//! npm registry client with connection pooling

use std::time::Duration;
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, ClientBuilder, StatusCode};
use tracing::debug;

use plook_core::error::PlookError;
use crate::api::{PackageInfo, PackageLookup, PackageMetadataResponse};
use crate::versions::order_newest_first;
use crate::{PackageRegistry, RegistryResult};

/// Default npm registry endpoint
pub const DEFAULT_NPM_REGISTRY: &str = "https://registry.npmjs.org";

/// HTTP client settings shared by every registry backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Total request timeout
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("plook/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Authentication configuration for registry access
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Bearer token for authentication
    pub token: Option<String>,
}

/// Build a pooled HTTP client, optionally sending a bearer token
pub(crate) fn build_http_client(config: &ClientConfig, auth: &AuthConfig) -> RegistryResult<Client> {
    let mut builder = ClientBuilder::new()
        // Connection pooling configuration
        .pool_max_idle_per_host(50)
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(config.timeout)
        .gzip(true)
        .user_agent(config.user_agent.clone());

    if let Some(token) = &auth.token {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", token).parse()
                .map_err(|e| PlookError::network("Invalid auth token".to_string(), e))?,
        );
        builder = builder.default_headers(headers);
    }

    builder.build()
        .map_err(|e| PlookError::network(format!("Failed to create HTTP client: {}", e), e))
}

/// npm registry backend
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Base registry URL
    base_url: String,
}

impl NpmRegistry {
    /// Create a client for the public npm registry
    pub fn new() -> RegistryResult<Self> {
        Self::with_config(DEFAULT_NPM_REGISTRY, &ClientConfig::default(), &AuthConfig::default())
    }

    /// Create a client for any npm-compatible registry
    pub fn with_config(base_url: &str, config: &ClientConfig, auth: &AuthConfig) -> RegistryResult<Self> {
        Ok(Self {
            client: build_http_client(config, auth)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Registry endpoint this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the package document, `None` when the registry answers 404
    pub async fn fetch_metadata(&self, package_name: &str) -> RegistryResult<Option<PackageMetadataResponse>> {
        let Some(segment) = encode_package_name(package_name) else {
            return Ok(None);
        };
        let url = format!("{}/{}", self.base_url, segment);
        debug!("Fetching npm metadata from {}", url);

        let response = self.client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| PlookError::registry(format!("Failed to fetch metadata: {}", e), e))?;

        match response.status() {
            StatusCode::OK => {
                let metadata = response.json::<PackageMetadataResponse>()
                    .await
                    .map_err(|e| PlookError::registry(format!("Failed to parse metadata: {}", e), e))?;
                Ok(Some(metadata))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(PlookError::Registry {
                message: format!("Registry returned status {}: {}", status, package_name),
                source: None,
            }),
        }
    }
}

#[async_trait]
impl PackageRegistry for NpmRegistry {
    async fn lookup(&self, name: &str) -> RegistryResult<Option<PackageLookup>> {
        let Some(metadata) = self.fetch_metadata(name).await? else {
            return Ok(None);
        };

        let latest = metadata.dist_tags.get("latest")
            .and_then(|tag| metadata.versions.get(tag))
            .and_then(|version| version.repository.as_ref());
        let url = latest
            .or(metadata.repository.as_ref())
            .and_then(|repository| repository.url())
            .unwrap_or_default();

        Ok(Some(PackageLookup { name: metadata.name, url }))
    }

    async fn info(&self, name: &str) -> RegistryResult<PackageInfo> {
        let metadata = self.fetch_metadata(name).await?
            .ok_or_else(|| PlookError::PackageNotFound { name: name.to_string() })?;

        let latest = metadata.dist_tags.get("latest").map(String::as_str);
        let versions = order_newest_first(metadata.versions.keys().cloned(), latest);

        Ok(PackageInfo { name: metadata.name, versions })
    }
}

/// Bytes escaped in a registry path segment. `/` is included so a name never
/// spans more than one segment, which also keeps npm scopes as `@scope%2Fname`.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'/');

/// Encode a package name as a single URL path segment.
///
/// Returns `None` for names that URL parsers treat as dot segments, even when
/// escaped. Such names can never exist in a registry.
pub(crate) fn encode_package_name(name: &str) -> Option<String> {
    if name == "." || name == ".." {
        return None;
    }
    Some(utf8_percent_encode(name, PATH_SEGMENT).to_string())
}
