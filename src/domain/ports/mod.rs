//! Port trait definitions (Hexagonal Architecture)
//!
//! The supervisor core depends only on these traits:
//! - CommandRunner: one-shot build commands
//! - AssetStore: filesystem operations for asset staging
//! - BrowserOpener: opening browser tabs
//! - ReadinessProbe: deciding when a started role is usable
//! - OutputSink: where child process output goes
//!
//! Infrastructure adapters implement them; tests substitute recording fakes.

pub mod asset_store;
pub mod browser;
pub mod command_runner;
pub mod output_sink;
pub mod readiness;

pub use asset_store::AssetStore;
pub use browser::BrowserOpener;
pub use command_runner::CommandRunner;
pub use output_sink::OutputSink;
pub use readiness::ReadinessProbe;
