//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output. Status lines go to
//! stderr so plan documents written to stdout stay machine-readable.

use buildplan_core::Error;
use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        eprintln!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Print an error with its code, context and suggestion
///
/// With `json` set, the serialized error report is printed to stderr instead.
pub fn report_error(err: &Error, json: bool) {
    if json {
        match serde_json::to_string(&err.to_report()) {
            Ok(line) => eprintln!("{line}"),
            Err(_) => Status::error(&err.to_string()),
        }
        return;
    }

    Status::error(&format!("[{}] {}", err.code.red(), err.message));
    if let Some(ctx) = &err.context {
        eprintln!("  {} {}", "context:".dimmed(), ctx);
    }
    if let Some(suggestion) = &err.suggestion {
        eprintln!("  {} {}", "hint:".cyan(), suggestion);
    }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        format!("{}µs", duration.as_micros())
    } else if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else {
        format!("{secs:.1}s")
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Pad a cell to a fixed width for simple aligned tables
pub fn pad(value: &str, width: usize) -> String {
    format!("{value:<width$}")
}
