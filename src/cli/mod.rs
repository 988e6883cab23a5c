//! Command-line surface: flags, the interactive command loop and its output.

pub mod command_loop;
pub mod display;
pub mod input;
pub mod types;

pub use command_loop::{Command, CommandLoop, LoopExit, ParseError};
pub use input::{spawn_line_reader, spawn_stdin_reader};
pub use types::Cli;
