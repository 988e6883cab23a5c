//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - compact, pretty or JSON output on stderr
//! - optional JSON log files with rotation (tracing-appender)

pub mod logger;

pub use logger::LoggerImpl;
