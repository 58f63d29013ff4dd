//! plook.toml configuration parsing and serialization

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use plook_core::error::PlookError;
use plook_core::utils::url::DEFAULT_RAW_HOST;
use crate::ConfigResult;

/// Complete plook.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlookToml {
    /// HTTP listener settings
    pub server: ServerSection,

    /// Package registry settings
    pub registry: RegistrySection,

    /// Raw-content upstream settings
    pub upstream: UpstreamSection,

    /// Slug cache settings
    pub cache: CacheSection,
}

/// HTTP listener section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address to bind
    pub bind: String,

    /// Port to listen on
    pub port: u16,

    /// Send `Access-Control-Allow-Origin: *` with every response
    pub cors: bool,
}

/// Which registry protocol packages are resolved against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    /// Bower registry plus GitHub tags
    #[default]
    Bower,
    /// npm registry packuments
    Npm,
}

/// Package registry section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    /// Registry protocol
    pub kind: RegistryKind,

    /// Registry endpoint, the public one for `kind` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Bearer token sent to the npm registry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// GitHub API endpoint used to list tags for Bower packages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_api_url: Option<String>,

    /// Token sent to the GitHub API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
}

/// Raw-content upstream section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSection {
    /// Base URL candidates are built against
    pub raw_host: String,

    /// Timeout of each upstream request, in seconds
    pub timeout_secs: u64,

    /// Deadline for the whole candidate race, in seconds
    pub race_timeout_secs: u64,

    /// User agent sent to every upstream
    pub user_agent: String,
}

/// Slug cache section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Maximum number of cached package slugs
    pub capacity: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            cors: true,
        }
    }
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            raw_host: DEFAULT_RAW_HOST.to_string(),
            timeout_secs: 30,
            race_timeout_secs: 60,
            user_agent: concat!("plook/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self { capacity: 500 }
    }
}

impl UpstreamSection {
    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whole-race deadline
    pub fn race_timeout(&self) -> Duration {
        Duration::from_secs(self.race_timeout_secs)
    }
}

impl ServerSection {
    /// `bind:port` socket address string
    pub fn address(&self) -> String {
        if self.bind.contains(':') {
            format!("[{}]:{}", self.bind, self.port)
        } else {
            format!("{}:{}", self.bind, self.port)
        }
    }
}

impl FromStr for RegistryKind {
    type Err = PlookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bower" => Ok(RegistryKind::Bower),
            "npm" => Ok(RegistryKind::Npm),
            other => Err(PlookError::ConfigValidation {
                field: "registry.kind".to_string(),
                reason: format!("Unknown registry '{}', expected 'bower' or 'npm'", other),
            }),
        }
    }
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryKind::Bower => write!(f, "bower"),
            RegistryKind::Npm => write!(f, "npm"),
        }
    }
}

/// Parse TOML string to PlookToml configuration
pub fn parse_plook_toml(content: &str) -> ConfigResult<PlookToml> {
    let table = parse_table(content)?;
    let config = from_table(table)?;

    validate_config(&config)?;

    Ok(config)
}

/// Parse TOML string into an untyped table, for layering
pub fn parse_table(content: &str) -> ConfigResult<::toml::Table> {
    // First try with toml_edit for better error reporting
    content.parse::<toml_edit::DocumentMut>()
        .map_err(|e| PlookError::TomlParse { message: format!("TOML syntax error: {}", e) })?;

    ::toml::from_str(content)
        .map_err(|e| PlookError::TomlParse { message: format!("TOML parsing error: {}", e) })
}

/// Deserialize a (possibly merged) table into PlookToml
pub fn from_table(table: ::toml::Table) -> ConfigResult<PlookToml> {
    ::toml::Value::Table(table)
        .try_into()
        .map_err(|e| PlookError::TomlParse { message: format!("TOML parsing error: {}", e) })
}

/// Validate configuration values
pub fn validate_config(config: &PlookToml) -> ConfigResult<()> {
    if config.server.port == 0 {
        return Err(invalid("server.port", "Port must be between 1 and 65535"));
    }

    if config.server.bind.trim().is_empty() {
        return Err(invalid("server.bind", "Bind address must not be empty"));
    }

    if config.cache.capacity == 0 {
        return Err(invalid("cache.capacity", "Cache capacity must be at least 1"));
    }

    if config.upstream.timeout_secs == 0 {
        return Err(invalid("upstream.timeout_secs", "Timeout must be at least 1 second"));
    }

    if config.upstream.race_timeout_secs == 0 {
        return Err(invalid("upstream.race_timeout_secs", "Timeout must be at least 1 second"));
    }

    validate_http_url("upstream.raw_host", &config.upstream.raw_host)?;

    if let Some(url) = &config.registry.url {
        validate_http_url("registry.url", url)?;
    }

    if let Some(url) = &config.registry.github_api_url {
        validate_http_url("registry.github_api_url", url)?;
    }

    Ok(())
}

/// Load plook.toml from file path as an untyped table, for layering.
///
/// The file is checked on its own before it is merged, so type and
/// validation errors name the file they came from.
pub async fn load_table_from_file(path: &camino::Utf8Path) -> ConfigResult<::toml::Table> {
    let content = read_file(path).await?;

    let table = parse_table(&content).map_err(|e| in_file(path, e))?;
    from_table(table.clone())
        .and_then(|config| validate_config(&config))
        .map_err(|e| in_file(path, e))?;

    Ok(table)
}

async fn read_file(path: &camino::Utf8Path) -> ConfigResult<String> {
    tokio::fs::read_to_string(path).await
        .map_err(|e| PlookError::io(format!("Failed to read {}", path), e))
}

/// Prefix parse and validation errors with the file they came from
fn in_file(path: &camino::Utf8Path, error: PlookError) -> PlookError {
    match error {
        PlookError::TomlParse { message } => PlookError::TomlParse {
            message: format!("In file {}: {}", path, message),
        },
        PlookError::ConfigValidation { field, reason } => PlookError::ConfigValidation {
            field,
            reason: format!("In file {}: {}", path, reason),
        },
        other => other,
    }
}

fn invalid(field: &str, reason: &str) -> PlookError {
    PlookError::ConfigValidation {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Check that a value is an absolute http(s) URL
fn validate_http_url(field: &str, value: &str) -> ConfigResult<()> {
    let url = url::Url::parse(value)
        .map_err(|e| invalid(field, &format!("Invalid URL '{}': {}", value, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(field, &format!("Unsupported URL scheme '{}'", scheme))),
    }
}
