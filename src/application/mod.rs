pub mod launcher;

pub use launcher::{LaunchOptions, LaunchOutcome, Launcher};
