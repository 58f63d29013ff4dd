//! Candidate upstream URLs.

use std::fmt;

use super::RepositorySlug;
use crate::utils::url::raw_content_url;

/// One speculative upstream location of a file at a given git ref
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    /// Git ref the URL points at (`1.0.0` or `v1.0.0`)
    pub git_ref: String,
    /// Fully qualified raw-content URL
    pub url: String,
}

impl CandidateUrl {
    /// Build the candidate for a single ref
    pub fn new(base: &str, slug: &RepositorySlug, git_ref: &str, file: &str) -> Self {
        Self {
            git_ref: git_ref.to_string(),
            url: raw_content_url(base, slug, git_ref, file),
        }
    }

    /// Build both candidates for a version: the `v`-prefixed tag first, then
    /// the bare one. Repositories are inconsistent about which they tag.
    pub fn for_version(base: &str, slug: &RepositorySlug, version: &str, file: &str) -> [Self; 2] {
        ["v", ""].map(|prefix| Self::new(base, slug, &format!("{}{}", prefix, version), file))
    }

    /// The URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for CandidateUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
