//! Version tokens as supplied by callers.

use std::fmt;

/// Requested version, normalized from the raw path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionToken {
    /// The newest version known to the registry
    Latest,
    /// A literal version with any leading `v` removed
    Exact(String),
}

impl VersionToken {
    /// Normalize a raw version string.
    ///
    /// `latest` is matched case-insensitively. Otherwise a single leading `v`
    /// is stripped and the remainder is kept verbatim.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if raw.eq_ignore_ascii_case("latest") {
            return VersionToken::Latest;
        }

        let version = raw.strip_prefix('v').unwrap_or(raw);
        VersionToken::Exact(version.to_string())
    }

    /// Check if this token asks for the newest version
    pub fn is_latest(&self) -> bool {
        matches!(self, VersionToken::Latest)
    }

    /// Pick the concrete version out of a newest-first version list
    pub fn select<'a>(&self, versions: &'a [String]) -> Option<&'a str> {
        match self {
            VersionToken::Latest => versions.first().map(String::as_str),
            VersionToken::Exact(version) => versions
                .iter()
                .find(|known| *known == version)
                .map(String::as_str),
        }
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionToken::Latest => write!(f, "latest"),
            VersionToken::Exact(version) => write!(f, "{}", version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(list: &[&str]) -> Vec<String> {
        list.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_latest() {
        assert_eq!(VersionToken::parse("latest"), VersionToken::Latest);
        assert_eq!(VersionToken::parse("LATEST"), VersionToken::Latest);
        assert_eq!(VersionToken::parse(" Latest "), VersionToken::Latest);
        assert!(VersionToken::parse("latest").is_latest());
    }

    #[test]
    fn test_parse_strips_single_v() {
        assert_eq!(VersionToken::parse("v1.2.3"), VersionToken::Exact("1.2.3".to_string()));
        assert_eq!(VersionToken::parse("1.2.3"), VersionToken::Exact("1.2.3".to_string()));
        assert_eq!(VersionToken::parse("vv1.0"), VersionToken::Exact("v1.0".to_string()));
    }

    #[test]
    fn test_select_latest_is_first() {
        let list = versions(&["1.0.0", "0.9.1", "0.9.0"]);
        assert_eq!(VersionToken::Latest.select(&list), Some("1.0.0"));
        assert_eq!(VersionToken::Latest.select(&[]), None);
    }

    #[test]
    fn test_select_exact_requires_membership() {
        let list = versions(&["1.0.0"]);
        assert_eq!(VersionToken::parse("v1.0.0").select(&list), Some("1.0.0"));
        assert_eq!(VersionToken::parse("1.0.0").select(&list), Some("1.0.0"));
        assert_eq!(VersionToken::parse("2.0.0").select(&list), None);
    }
}
