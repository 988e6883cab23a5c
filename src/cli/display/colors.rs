//! State color mapping for status output.

use comfy_table::Color;

use crate::domain::models::{ProcessState, Role};

/// Table color for a process state.
///
/// Green running, yellow stopping, red failed, grey otherwise.
pub fn state_color(state: ProcessState) -> Color {
    match state {
        ProcessState::Running => Color::Green,
        ProcessState::Stopping => Color::Yellow,
        ProcessState::Failed => Color::Red,
        ProcessState::NotStarted | ProcessState::Stopped => Color::DarkGrey,
    }
}

/// Matches the colors of the `[role]` output prefixes.
pub fn role_color(role: Role) -> Color {
    match role {
        Role::Frontend => Color::Magenta,
        Role::Backend => Color::Cyan,
    }
}
