//! Request path utilities.
//!
//! Splits inbound paths into their package, version and file parts and rejects
//! file paths that would climb out of the requested ref.

/// Split `/{package}/{version}/{file...}` into its three parts.
///
/// The package segment may be empty (the resolver reports that as a missing
/// name); the version segment may not. The file part is everything after the
/// version segment and may contain further slashes or be empty.
pub fn split_request_path(path: &str) -> Option<(&str, &str, &str)> {
    let path = path.strip_prefix('/')?;
    let mut parts = path.splitn(3, '/');

    let package = parts.next()?;
    let version = parts.next().filter(|version| !version.is_empty())?;
    let file = parts.next()?;

    Some((package, version, file))
}

/// Check if a file path stays inside its ref (no `..` segments, no backslashes)
pub fn is_safe_file_path(file: &str) -> bool {
    !file.contains('\\') && file.split('/').all(|segment| segment != "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_request_path() {
        assert_eq!(
            split_request_path("/jquery/1.0.0/dist/jquery.js"),
            Some(("jquery", "1.0.0", "dist/jquery.js"))
        );
        assert_eq!(split_request_path("/jquery/latest/"), Some(("jquery", "latest", "")));
        assert_eq!(split_request_path("//1.0.0/bar.js"), Some(("", "1.0.0", "bar.js")));
    }

    #[test]
    fn test_split_request_path_rejects_short_paths() {
        assert_eq!(split_request_path("/"), None);
        assert_eq!(split_request_path("/jquery"), None);
        assert_eq!(split_request_path("/jquery/1.0.0"), None);
        assert_eq!(split_request_path("/jquery//bar.js"), None);
        assert_eq!(split_request_path("jquery/1.0.0/bar.js"), None);
    }

    #[test]
    fn test_is_safe_file_path() {
        assert!(is_safe_file_path("dist/jquery.js"));
        assert!(is_safe_file_path(""));
        assert!(is_safe_file_path("a..b/file.js"));
        assert!(!is_safe_file_path("../other/repo/file.js"));
        assert!(!is_safe_file_path("dist/../../x.js"));
        assert!(!is_safe_file_path("dist\\x.js"));
    }
}
