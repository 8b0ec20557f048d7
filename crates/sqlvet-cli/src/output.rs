//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use std::io::IsTerminal;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored when the terminal allows it
    Text,
    /// One JSON document with every problem
    Json,
}

/// When to color output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

/// Set up color output based on user preference
pub fn setup_colors(mode: ColorMode) {
    let enabled = match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal(),
    };
    colored::control::set_override(enabled);
}

/// Format an error for display, including its cause chain
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Format a failure summary for display
pub fn format_failure(message: &str) -> String {
    format!("{} {}", "Validation failed:".red().bold(), message)
}

/// `1 error` / `3 errors`
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "error"), "1 error");
        assert_eq!(plural(0, "warning"), "0 warnings");
        assert_eq!(plural(4, "file"), "4 files");
    }

    #[test]
    fn test_format_error_shows_causes() {
        colored::control::set_override(false);
        let error = anyhow::anyhow!("bad json").context("failed to load catalog.json");
        assert_eq!(format_error(&error), "Error: failed to load catalog.json: bad json");
    }
}
