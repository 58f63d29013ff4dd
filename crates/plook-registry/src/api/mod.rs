//! Registry API response types

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Result of a registry lookup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PackageLookup {
    /// Package name
    pub name: String,
    /// Repository URL, empty when the package declares none
    pub url: String,
}

/// Result of a registry info call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PackageInfo {
    /// Package name
    pub name: String,
    /// Known versions, newest first
    pub versions: Vec<String>,
}

/// Package document from the npm registry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PackageMetadataResponse {
    /// Package name
    pub name: String,
    /// Distribution tags (`latest`, `next`, ...)
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,
    /// All versions metadata
    #[serde(default)]
    pub versions: HashMap<String, VersionMetadata>,
    /// Top-level repository, mirrors the latest version's field
    pub repository: Option<RepositoryField>,
}

/// Metadata for a specific package version
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VersionMetadata {
    /// Version string
    pub version: String,
    /// Repository information
    pub repository: Option<RepositoryField>,
}

/// npm `repository` field: either a bare string or an object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RepositoryField {
    /// `"github:owner/repo"`, `"owner/repo"` or a full URL
    Short(String),
    /// `{ "type": "git", "url": "..." }`
    Detailed {
        #[serde(rename = "type")]
        repo_type: Option<String>,
        url: Option<String>,
        directory: Option<String>,
    },
}

impl RepositoryField {
    /// Repository URL with npm shorthands expanded to GitHub URLs
    pub fn url(&self) -> Option<String> {
        match self {
            RepositoryField::Short(short) => Some(expand_shorthand(short)),
            RepositoryField::Detailed { url, .. } => url.as_deref().map(expand_shorthand),
        }
    }
}

/// Expand `github:owner/repo` and bare `owner/repo` into a GitHub URL
fn expand_shorthand(value: &str) -> String {
    let value = value.trim();

    if let Some(path) = value.strip_prefix("github:") {
        return format!("https://github.com/{}", path);
    }

    let is_bare_slug = !value.contains(':')
        && !value.contains('@')
        && value.matches('/').count() == 1
        && !value.starts_with('/')
        && !value.ends_with('/');
    if is_bare_slug {
        return format!("https://github.com/{}", value);
    }

    value.to_string()
}

/// Package entry from the Bower registry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BowerPackage {
    /// Package name
    pub name: String,
    /// Git endpoint of the package
    pub url: String,
}

/// Tag entry from the GitHub REST API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubTag {
    /// Tag name (`v1.0.0`, `1.0.0`, ...)
    pub name: String,
}
