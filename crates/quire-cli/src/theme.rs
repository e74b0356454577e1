//! CLI theme and styling.

use colored::Colorize;
use quire_core::Decision;

/// CLI theme configuration.
pub(crate) struct Theme;

impl Theme {
    /// Format a header.
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    /// Format an error message.
    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "✗".red(), text.red())
    }

    /// Format an info message.
    pub(crate) fn info(text: &str) -> String {
        format!("{} {}", "i".blue(), text)
    }

    /// Format a dimmed message.
    pub(crate) fn dimmed(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    /// Format a separator line.
    pub(crate) fn separator() -> String {
        "━".repeat(50).dimmed().to_string()
    }

    /// ALLOW in green, DENY in red, padded to a fixed width.
    pub(crate) fn decision(decision: Decision) -> String {
        let label = format!("{:<5}", decision.to_string());
        match decision {
            Decision::Allow => label.green().bold().to_string(),
            Decision::Deny => label.red().bold().to_string(),
        }
    }
}
