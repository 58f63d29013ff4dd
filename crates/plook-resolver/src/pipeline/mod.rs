//! The resolution pipeline: package → slug → version → candidates → race

use tracing::{info, warn, Instrument};

use plook_core::context::RequestContext;
use plook_core::error::ResolutionError;
use plook_core::types::{CandidateUrl, VersionToken};
use crate::package::PackageResolver;
use crate::racer::{CandidateRacer, ConditionalHeaders, UpstreamResult};
use crate::ResolverResult;

/// A request for one file of one package version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRequest {
    pub package: String,
    /// Raw version string as supplied by the caller
    pub version: String,
    pub file: String,
    pub conditional: ConditionalHeaders,
}

/// Resolves file requests into upstream responses
#[derive(Debug, Clone)]
pub struct Plook {
    resolver: PackageResolver,
    racer: CandidateRacer,
}

impl Plook {
    /// Create a pipeline from its two stages
    pub fn new(resolver: PackageResolver, racer: CandidateRacer) -> Self {
        Self { resolver, racer }
    }

    /// Package resolver stage
    pub fn resolver(&self) -> &PackageResolver {
        &self.resolver
    }

    /// Find the candidate URLs of a file without fetching anything.
    ///
    /// Fails before any upstream I/O if the package, its repository or the
    /// requested version cannot be resolved.
    pub async fn find_urls(&self, package: &str, version: &str, file: &str) -> ResolverResult<[CandidateUrl; 2]> {
        let token = VersionToken::parse(version);

        let slug = self.resolver.resolve_slug(package).await?;
        let version = self.resolver.resolve_version(package, &token).await?;

        Ok(self.racer.candidates(&slug, &version, file))
    }

    /// Resolve a file request and fetch it from the first candidate that has it
    pub async fn get(&self, request: &FileRequest, ctx: &RequestContext) -> Result<UpstreamResult, ResolutionError> {
        let span = ctx.span();
        let outcome = async {
            let candidates = self.find_urls(&request.package, &request.version, &request.file).await?;
            self.racer.race(candidates, &request.conditional).await
        }
        .instrument(span.clone())
        .await;

        span.in_scope(|| match outcome {
            Ok(result) => {
                info!(
                    status = result.status().as_u16(),
                    url = result.url(),
                    elapsed_ms = ctx.elapsed().as_millis() as u64,
                    "Resolved {}@{}/{}",
                    request.package,
                    request.version,
                    request.file
                );
                Ok(result)
            }
            Err(error) => {
                let resolved = ResolutionError::from(&error);
                let elapsed_ms = ctx.elapsed().as_millis() as u64;
                // Transient upstream failures warn
                if error.is_recoverable() {
                    warn!(
                        status = resolved.status,
                        elapsed_ms,
                        "Failed to resolve {}@{}/{}: {}",
                        request.package,
                        request.version,
                        request.file,
                        error
                    );
                } else {
                    info!(
                        status = resolved.status,
                        elapsed_ms,
                        "Failed to resolve {}@{}/{}: {}",
                        request.package,
                        request.version,
                        request.file,
                        error
                    );
                }
                Err(resolved)
            }
        })
    }
}
