//! Error message formatting with actionable suggestions.

use std::error::Error;
use plook_core::error::PlookError;
use super::OutputHandler;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    output: OutputHandler,
}

impl ErrorFormatter {
    /// Create a new error formatter
    pub fn new(output: OutputHandler) -> Self {
        Self { output }
    }

    /// Format an error with its status, suggestion and cause chain
    pub fn format_error(&self, error: &PlookError) -> String {
        let mut formatted = format!(
            "{}: {} ({})",
            self.output.paint("31", "error"),
            error,
            error.status_code()
        );

        if let Some(url) = error.expanded_url() {
            formatted.push_str(&format!("\n  {} {}", self.output.paint("2", "url:"), url));
        }

        if let Some(suggestion) = error.suggestion() {
            formatted.push_str(&format!("\n{}: {}", self.output.paint("2", "help"), suggestion));
        }

        let mut source = error.source();
        while let Some(cause) = source {
            formatted.push_str(&format!("\n{}: {}", self.output.paint("2", "caused by"), cause));
            source = cause.source();
        }

        formatted
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new(OutputHandler::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_suggestion() {
        let formatter = ErrorFormatter::new(OutputHandler::plain());
        let error = PlookError::VersionNotFound {
            name: "foo".to_string(),
            version: "2.0.0".to_string(),
        };

        let formatted = formatter.format_error(&error);
        assert!(formatted.starts_with("error: Version not found (404)"));
        assert!(formatted.contains("help: Use 'latest'"));
    }

    #[test]
    fn test_format_with_url() {
        let formatter = ErrorFormatter::new(OutputHandler::plain());
        let error = PlookError::FileNotFound {
            url: "https://raw.githubusercontent.com/foo/bar/v1.0.0/bar.js".to_string(),
            upstream_status: Some(404),
        };

        let formatted = formatter.format_error(&error);
        assert!(formatted.contains("url: https://raw.githubusercontent.com/foo/bar/v1.0.0/bar.js"));
    }

    #[test]
    fn test_format_with_cause() {
        let formatter = ErrorFormatter::new(OutputHandler::plain());
        let error = PlookError::io(
            "Failed to bind 0.0.0.0:3000".to_string(),
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        );

        let formatted = formatter.format_error(&error);
        assert!(formatted.contains("caused by: address in use"));
    }
}
