//! httpprobe
//!
//! A single-shot HTTP/HTTPS probe. One GET request is timed phase by phase
//! (name resolution, TCP connect, first byte, transfer) and the response is
//! checked for a 200 status and, optionally, a substring.

pub mod cli;
pub mod client;
pub mod config;
pub mod dns;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod target;
pub mod timing;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorReporter, Result};
pub use models::{ProbeConfig, ProbeReport, Timings};
pub use output::Reporter;
pub use probe::{ProbeSession, ProbeState};
pub use target::Target;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build information captured by build.rs
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// `--version` long form
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT"),
    ", built ",
    env!("BUILD_TIME"),
    " for ",
    env!("TARGET_TRIPLE"),
    ")"
);

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_WAIT_TIME: Duration = Duration::from_secs(5);
    pub const DEFAULT_MAX_CONTENT: usize = 4 * 1024 * 1024;
    pub const DEFAULT_USER_AGENT: &str = "curl/7.29.0";
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Bytes of the first read: `HTTP/1.x NNN`
    pub const STATUS_PROBE_LEN: usize = 12;
    /// Offset of the status code within the first read
    pub const STATUS_CODE_OFFSET: usize = 9;

    pub use crate::target::MAX_HOST_LEN;
}
