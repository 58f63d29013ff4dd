//! Repository slug extraction.
//!
//! A slug is the `owner/repo` pair identifying a GitHub repository. Registries
//! hand out repository URLs in many shapes (`git://`, `https://`, `git@host:`,
//! with or without `.git`), and all of them collapse to the same slug.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Matches `proto://github.com/owner/repo[.git][/]` and `user@github.com:owner/repo[.git][/]`
static GITHUB_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:@|://)github\.com[:/]([^/\s]+?)/([^/\s]+?)(?:\.git)?/?$")
        .expect("github url pattern is valid")
});

/// Normalized `owner/repo` identifier of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositorySlug {
    owner: String,
    repo: String,
}

impl RepositorySlug {
    /// Create a slug from its two segments
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Extract a slug from a repository URL, `None` if it is not a GitHub URL
    pub fn from_repository_url(url: &str) -> Option<Self> {
        let captures = GITHUB_URL.captures(url.trim())?;
        let owner = captures.get(1)?.as_str();
        let repo = captures.get(2)?.as_str();

        Some(Self::new(owner, repo))
    }

    /// Repository owner (user or organization)
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl fmt::Display for RepositorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
