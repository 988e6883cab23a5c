use std::fmt;

use super::role::Role;

/// Which standard stream a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// One line of output from a supervised process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub role: Role,
    pub stream: StreamKind,
    pub line: String,
}

impl OutputLine {
    pub fn new(role: Role, stream: StreamKind, line: impl Into<String>) -> Self {
        Self {
            role,
            stream,
            line: line.into(),
        }
    }

    pub fn is_stderr(&self) -> bool {
        self.stream == StreamKind::Stderr
    }
}
