//! Logging setup using `tracing` + `tracing-subscriber`
//!
//! Priority for determining the log level:
//! 1. `--verbose` flag, which means `debug`
//! 2. `SUBJECTS_GRAPH_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `warn`
//!
//! Logs go to stderr so that stdout only carries command output.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::fmt;

pub const LOG_ENV: &str = "SUBJECTS_GRAPH_LOG";

/// Installs the global subscriber. Call once at startup.
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        Level::DEBUG
    } else {
        std::env::var(LOG_ENV)
            .ok()
            .and_then(|s| parse_level(&s))
            .unwrap_or(Level::WARN)
    };

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {}", e))
}

fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
