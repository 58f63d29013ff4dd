//! Terminal output for the CLI commands.
//!
//! Log lines go through `tracing`; this module only prints what a command
//! reports directly to the user.

pub mod errors;

use std::io::{self, IsTerminal};

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: bool,
}

impl OutputHandler {
    /// Create a new output handler, coloring only on a terminal without NO_COLOR
    pub fn new() -> Self {
        Self {
            colors: std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal(),
        }
    }

    /// Output handler that never colors
    pub fn plain() -> Self {
        Self { colors: false }
    }

    /// Print a line as-is
    pub fn line(&self, message: &str) {
        println!("{}", message);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", self.paint("32", "✓"), message);
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{}", message);
    }

    pub(crate) fn paint(&self, code: &str, text: &str) -> String {
        if self.colors {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
