//! Display helpers for interactive output.
//!
//! Operation results, status tables and help text. Everything here writes
//! to stdout alongside the `[role]` lines; diagnostics go to stderr.

pub mod colors;
pub mod table;

use console::style;

use crate::domain::models::{Operation, OperationReport};

pub use colors::*;
pub use table::*;

/// Render a success action result.
pub fn action_success(message: &str) -> String {
    format!("{} {}", style("\u{2713}").green().bold(), message)
}

/// Render a failure action result.
pub fn action_failure(message: &str) -> String {
    format!("{} {}", style("\u{2717}").red().bold(), message)
}

/// Render a declined action.
pub fn action_notice(message: &str) -> String {
    format!("{} {}", style("\u{2022}").yellow().bold(), message)
}

/// Render the outcome of a composite operation.
pub fn render_report(report: &OperationReport) -> String {
    if report.is_success() {
        let mut out = action_success(&report.summary());
        if report.operation == Operation::RestartFrontendOnly {
            out.push_str("\n  Reload open browser tabs to pick up the new assets.");
        }
        out
    } else if report.is_refused() {
        action_notice(&report.summary())
    } else {
        action_failure(&report.summary())
    }
}

pub fn print_report(report: &OperationReport) {
    if report.is_success() || report.is_refused() {
        println!("{}", render_report(report));
    } else {
        eprintln!("{}", render_report(report));
    }
}

pub fn help_text() -> String {
    let rows = [
        ("r", "rebuild everything and restart the backend"),
        ("f", "rebuild and restage the frontend"),
        ("b", "rebuild and restart the backend"),
        ("s [role]", "start a role if stopped (default backend)"),
        ("k [role]", "stop a role if running (default backend)"),
        ("o", "open the browser"),
        ("p", "show process status"),
        ("h, ?", "show this help"),
        ("q", "stop everything and quit"),
    ];

    let mut out = format!("{}\n", style("Commands:").bold());
    for (keys, description) in rows {
        out.push_str(&format!("  {:<10} {description}\n", style(keys).cyan()));
    }
    out
}
