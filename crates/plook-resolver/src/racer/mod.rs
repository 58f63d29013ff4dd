//! Concurrent fetching of candidate upstream URLs

use std::time::Duration;
use reqwest::header::{HeaderMap, CONTENT_TYPE, ETAG, IF_NONE_MATCH};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use tracing::debug;

use plook_core::error::PlookError;
use plook_core::types::{CandidateUrl, RepositorySlug};
use plook_core::utils::url::DEFAULT_RAW_HOST;
use crate::race::first_ok;
use crate::ResolverResult;

/// Settings of the upstream fetcher
#[derive(Debug, Clone)]
pub struct RacerConfig {
    /// Raw-content base URL candidates are built against
    pub raw_host: String,
    /// Connect timeout and idle-read timeout of each upstream fetch.
    /// A body that keeps arriving is never cut off.
    pub timeout: Duration,
    /// Deadline for the whole race
    pub race_timeout: Duration,
    /// User agent sent upstream
    pub user_agent: String,
}

impl Default for RacerConfig {
    fn default() -> Self {
        Self {
            raw_host: DEFAULT_RAW_HOST.to_string(),
            timeout: Duration::from_secs(30),
            race_timeout: Duration::from_secs(60),
            user_agent: concat!("plook/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Cache-validation headers forwarded from the caller to every candidate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalHeaders {
    /// Inbound `If-None-Match`, forwarded verbatim
    pub if_none_match: Option<String>,
}

/// The winning upstream response and the candidate that produced it
#[derive(Debug)]
pub struct UpstreamResult {
    pub candidate: CandidateUrl,
    pub response: Response,
}

impl UpstreamResult {
    /// URL that was actually fetched
    pub fn url(&self) -> &str {
        self.candidate.as_str()
    }

    /// Upstream status code
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// Upstream headers
    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    /// Upstream `Content-Type`, if present and valid text
    pub fn content_type(&self) -> Option<&str> {
        self.headers().get(CONTENT_TYPE)?.to_str().ok()
    }

    /// Upstream `ETag`, if present and valid text
    pub fn etag(&self) -> Option<&str> {
        self.headers().get(ETAG)?.to_str().ok()
    }
}

/// Fetches candidate URLs concurrently, first success wins
#[derive(Debug, Clone)]
pub struct CandidateRacer {
    client: Client,
    raw_host: String,
    race_timeout: Duration,
}

impl CandidateRacer {
    /// Create a racer against the public raw-content host
    pub fn new() -> ResolverResult<Self> {
        Self::with_config(RacerConfig::default())
    }

    /// Create a racer with custom settings
    pub fn with_config(config: RacerConfig) -> ResolverResult<Self> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| PlookError::network(format!("Failed to create HTTP client: {}", e), e))?;

        Ok(Self {
            client,
            raw_host: config.raw_host,
            race_timeout: config.race_timeout,
        })
    }

    /// Raw-content base URL
    pub fn raw_host(&self) -> &str {
        &self.raw_host
    }

    /// Build the two candidates for a resolved version
    pub fn candidates(&self, slug: &RepositorySlug, version: &str, file: &str) -> [CandidateUrl; 2] {
        CandidateUrl::for_version(&self.raw_host, slug, version, file)
    }

    /// Fetch every candidate concurrently and return the first response below 400.
    ///
    /// When every candidate fails, the failure of the first candidate given is
    /// reported. A race that outlives the deadline fails with `UpstreamTimeout`.
    pub async fn race<I>(&self, candidates: I, conditional: &ConditionalHeaders) -> ResolverResult<UpstreamResult>
    where
        I: IntoIterator<Item = CandidateUrl>,
    {
        let fetches = candidates
            .into_iter()
            .map(|candidate| self.fetch(candidate, conditional));

        match tokio::time::timeout(self.race_timeout, first_ok(fetches)).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(failures)) => Err(failures.into_iter().next().unwrap_or_else(|| PlookError::Network {
                message: "No candidate URLs to fetch".to_string(),
                source: None,
            })),
            Err(_) => Err(PlookError::UpstreamTimeout),
        }
    }

    /// Fetch one candidate, treating any status of 400 or above as a failure
    async fn fetch(&self, candidate: CandidateUrl, conditional: &ConditionalHeaders) -> ResolverResult<UpstreamResult> {
        let mut request = self.client.get(candidate.as_str());
        if let Some(etag) = &conditional.if_none_match {
            request = request.header(IF_NONE_MATCH, etag.as_str());
        }

        match request.send().await {
            Ok(response) if response.status().as_u16() < 400 => {
                debug!("Candidate {} answered {}", candidate, response.status());
                Ok(UpstreamResult { candidate, response })
            }
            Ok(response) => {
                debug!("Candidate {} failed with {}", candidate, response.status());
                Err(PlookError::FileNotFound {
                    url: candidate.url,
                    upstream_status: Some(response.status().as_u16()),
                })
            }
            Err(e) => {
                debug!("Candidate {} failed: {}", candidate, e);
                Err(PlookError::FileNotFound {
                    url: candidate.url,
                    upstream_status: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests;
