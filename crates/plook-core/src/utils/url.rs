//! Raw-content URL building.

use crate::types::RepositorySlug;

/// Default raw-content host for GitHub repositories
pub const DEFAULT_RAW_HOST: &str = "https://raw.githubusercontent.com";

/// Join a slug, a git ref and a file path into a raw-content URL.
///
/// Produces `<base>/<owner>/<repo>/<ref>/<file>`. A trailing slash on `base`
/// and a leading slash on `file` are not doubled.
pub fn raw_content_url(base: &str, slug: &RepositorySlug, git_ref: &str, file: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        base.trim_end_matches('/'),
        slug,
        git_ref,
        file.trim_start_matches('/')
    )
}
