//! Output port - destination for lines read from supervised processes.

use crate::domain::models::OutputLine;

/// Receives output lines from reader tasks.
///
/// Called from reader tasks without any supervisor lock held, so
/// implementations must not block for long.
pub trait OutputSink: Send + Sync {
    fn forward(&self, line: OutputLine);
}
