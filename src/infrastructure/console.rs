//! Console output sink.
//!
//! Child stdout goes to our stdout as `[role] line`; child stderr goes to our
//! stderr as `[role!] line` so the two stay distinguishable even when colors
//! are off.

use console::{style, Color};
use std::io::Write;

use crate::domain::models::{OutputLine, Role};
use crate::domain::ports::OutputSink;

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    fn role_color(role: Role) -> Color {
        match role {
            Role::Frontend => Color::Magenta,
            Role::Backend => Color::Cyan,
        }
    }

    /// Prefix for a line, without styling.
    pub fn prefix(line: &OutputLine) -> String {
        if line.is_stderr() {
            format!("[{}!]", line.role)
        } else {
            format!("[{}]", line.role)
        }
    }
}

impl OutputSink for ConsoleSink {
    fn forward(&self, line: OutputLine) {
        let prefix = style(Self::prefix(&line)).fg(Self::role_color(line.role)).bold();
        // A closed terminal is not worth failing a reader over.
        if line.is_stderr() {
            let _ = writeln!(std::io::stderr().lock(), "{prefix} {}", style(&line.line).red());
        } else {
            let _ = writeln!(std::io::stdout().lock(), "{prefix} {}", line.line);
        }
    }
}
