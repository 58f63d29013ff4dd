//! Error types and result aliases for plook operations.
//!
//! Every stage of a resolution (registry lookup, version check, upstream race)
//! fails with a [`PlookError`]. Before a failure crosses into the HTTP layer it
//! is flattened into a [`ResolutionError`], the uniform `(status, message, url)`
//! shape the relay knows how to answer with.

use std::fmt;
use thiserror::Error;

/// Unified error type for all plook operations
#[derive(Error, Debug)]
pub enum PlookError {
    // Request errors
    #[error("Package name not provided")]
    MissingPackageName,

    #[error("Not found")]
    RouteNotFound,

    // Registry errors
    #[error("Package not found")]
    PackageNotFound { name: String },

    #[error("Not a GitHub repository")]
    UnsupportedRepository { name: String, url: String },

    #[error("No versions available")]
    NoVersions { name: String },

    #[error("Version not found")]
    VersionNotFound { name: String, version: String },

    #[error("Registry error: {message}")]
    Registry {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Upstream errors
    #[error("File not found")]
    FileNotFound {
        url: String,
        /// Upstream status, `None` when the fetch failed at the transport level
        upstream_status: Option<u16>,
    },

    #[error("Upstream timed out")]
    UpstreamTimeout,

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Config errors
    #[error("Failed to parse plook.toml: {message}")]
    TomlParse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for plook operations
pub type PlookResult<T> = Result<T, PlookError>;

impl PlookError {
    /// Create a network error from any error type
    pub fn network<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create a registry error from any error type
    pub fn registry<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Registry {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// HTTP status code this error is answered with
    pub fn status_code(&self) -> u16 {
        match self {
            PlookError::MissingPackageName => 400,
            PlookError::RouteNotFound
            | PlookError::PackageNotFound { .. }
            | PlookError::NoVersions { .. }
            | PlookError::VersionNotFound { .. }
            | PlookError::FileNotFound { .. } => 404,
            PlookError::UnsupportedRepository { .. } => 412,
            PlookError::UpstreamTimeout => 504,
            PlookError::Registry { .. } | PlookError::Network { .. } => 502,
            PlookError::TomlParse { .. }
            | PlookError::ConfigValidation { .. }
            | PlookError::Io { .. } => 500,
        }
    }

    /// Upstream URL that produced this error, if any
    pub fn expanded_url(&self) -> Option<&str> {
        match self {
            PlookError::FileNotFound { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlookError::Network { .. } | PlookError::Registry { .. } | PlookError::UpstreamTimeout
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            PlookError::PackageNotFound { .. } => {
                Some("Check the package name spelling or try searching the registry")
            },
            PlookError::VersionNotFound { .. } => {
                Some("Use 'latest' or one of the versions published to the registry")
            },
            PlookError::UnsupportedRepository { .. } => {
                Some("Only packages hosted on GitHub can be served")
            },
            PlookError::Network { .. } => Some("Check your internet connection and try again"),
            PlookError::ConfigValidation { .. } | PlookError::TomlParse { .. } => {
                Some("Fix the value in plook.toml or the matching PLOOK_* variable")
            },
            _ => None,
        }
    }
}

/// A failure normalized for the caller: status, message and the upstream URL
/// that produced it, if there was one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionError {
    pub status: u16,
    pub message: String,
    pub url: Option<String>,
}

impl ResolutionError {
    /// Create a resolution error without an upstream URL
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            url: None,
        }
    }

    /// Attach the upstream URL that produced this failure
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl From<PlookError> for ResolutionError {
    fn from(error: PlookError) -> Self {
        Self::from(&error)
    }
}

impl From<&PlookError> for ResolutionError {
    fn from(error: &PlookError) -> Self {
        Self {
            status: error.status_code(),
            message: error.to_string(),
            url: error.expanded_url().map(str::to_string),
        }
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.url {
            Some(url) => write!(f, "{} {} ({})", self.status, self.message, url),
            None => write!(f, "{} {}", self.status, self.message),
        }
    }
}

impl std::error::Error for ResolutionError {}
