//! Process infrastructure
//!
//! - `SystemCommandRunner`: one-shot build commands
//! - `ProcessHandle`: lifecycle of one long-lived child per role
//! - `OutputStreamer`: background stdout/stderr readers
//! - termination primitives (SIGTERM / SIGKILL to the child's process group)

pub mod handle;
pub mod runner;
pub mod streamer;
pub mod termination;

pub use handle::{HandleSnapshot, ProcessHandle, StopOutcome, Transition};
pub use runner::SystemCommandRunner;
pub use streamer::OutputStreamer;
