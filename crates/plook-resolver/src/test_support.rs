//! In-memory registry used by the resolver and pipeline tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use plook_core::error::PlookError;
use plook_registry::{PackageInfo, PackageLookup, PackageRegistry, RegistryResult};

/// Registry answering from fixed tables and counting its calls
#[derive(Debug, Default)]
pub struct MockRegistry {
    urls: HashMap<String, String>,
    versions: HashMap<String, Vec<String>>,
    failing: bool,
    pub lookup_calls: AtomicUsize,
    pub info_calls: AtomicUsize,
}

impl MockRegistry {
    /// The `foo` package: `git://github.com/foo/bar.git`, versions `["1.0.0"]`
    pub fn foo() -> Self {
        Self::default().with_package("foo", "git://github.com/foo/bar.git", &["1.0.0"])
    }

    /// Registry whose every call fails at the transport level
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_package(mut self, name: &str, url: &str, versions: &[&str]) -> Self {
        self.urls.insert(name.to_string(), url.to_string());
        self.versions.insert(
            name.to_string(),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn infos(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    fn transport_error() -> PlookError {
        PlookError::Registry {
            message: "connection refused".to_string(),
            source: None,
        }
    }
}

#[async_trait]
impl PackageRegistry for MockRegistry {
    async fn lookup(&self, name: &str) -> RegistryResult<Option<PackageLookup>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(Self::transport_error());
        }

        Ok(self.urls.get(name).map(|url| PackageLookup {
            name: name.to_string(),
            url: url.clone(),
        }))
    }

    async fn info(&self, name: &str) -> RegistryResult<PackageInfo> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(Self::transport_error());
        }

        self.versions
            .get(name)
            .map(|versions| PackageInfo {
                name: name.to_string(),
                versions: versions.clone(),
            })
            .ok_or_else(|| PlookError::PackageNotFound { name: name.to_string() })
    }
}
