//! Table builder wrapper around comfy-table for status display.

use comfy_table::{presets, Attribute, Cell, CellAlignment, ContentArrangement, Table};

use super::colors::{role_color, state_color};
use crate::infrastructure::process::HandleSnapshot;

/// Create a standard list table with the given headers.
///
/// Uses the NOTHING preset (no borders) for a clean CLI aesthetic.
/// Respects NO_COLOR env var via comfy-table's built-in support.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| {
            Cell::new(h.to_uppercase())
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Left)
        }));
    table
}

/// One row per supervised role.
pub fn status_table(snapshots: &[HandleSnapshot]) -> Table {
    let mut table = list_table(&["role", "state", "pid", "uptime", "exit", "command"]);
    for snapshot in snapshots {
        table.add_row(vec![
            Cell::new(snapshot.role).fg(role_color(snapshot.role)),
            Cell::new(snapshot.state).fg(state_color(snapshot.state)),
            Cell::new(snapshot.pid.map_or_else(|| "-".to_string(), |pid| pid.to_string())),
            Cell::new(snapshot.uptime().map_or_else(|| "-".to_string(), format_uptime)),
            Cell::new(
                snapshot
                    .exit_code
                    .map_or_else(|| "-".to_string(), |code| code.to_string()),
            ),
            Cell::new(&snapshot.command),
        ]);
    }
    table
}

/// Compact `1h02m`, `3m07s` or `12s` rendering.
pub fn format_uptime(uptime: chrono::Duration) -> String {
    let secs = uptime.num_seconds().max(0);
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h{minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m{seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ProcessState, Role};

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(chrono::Duration::seconds(12)), "12s");
        assert_eq!(format_uptime(chrono::Duration::seconds(187)), "3m07s");
        assert_eq!(format_uptime(chrono::Duration::seconds(3720)), "1h02m");
        assert_eq!(format_uptime(chrono::Duration::seconds(-5)), "0s");
    }

    #[test]
    fn test_status_table_rows() {
        let snapshots = vec![HandleSnapshot {
            role: Role::Backend,
            state: ProcessState::Failed,
            pid: None,
            started_at: None,
            exit_code: Some(2),
            command: "./server".to_string(),
        }];
        let rendered = status_table(&snapshots).to_string();
        assert!(rendered.contains("backend"));
        assert!(rendered.contains("failed"));
        assert!(rendered.contains("./server"));
    }
}
