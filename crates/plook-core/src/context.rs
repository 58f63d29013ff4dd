//! Per-request context for correlated logging.
//!
//! The context is created by the HTTP layer and passed by reference through
//! every resolution stage, so log lines from the registry lookup, the version
//! check and the upstream race can be tied back to one inbound request.

use std::time::{Duration, Instant};
use tracing::Span;

/// Observability context of a single inbound request
#[derive(Debug, Clone)]
pub struct RequestContext {
    id: u64,
    path: String,
    started: Instant,
}

impl RequestContext {
    /// Create a context for request `id` targeting `path`
    pub fn new(id: u64, path: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
            started: Instant::now(),
        }
    }

    /// Request identifier, unique per server process
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Inbound request path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Time since the request was accepted
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Span every log line of this request is recorded under
    pub fn span(&self) -> Span {
        tracing::info_span!("request", id = self.id, path = %self.path)
    }
}
