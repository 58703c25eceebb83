//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Catalog | Pick a curriculum | `variants`, `use k23` |
//! | Query | Inspect the graph | `show`, `available`, `progress` |
//! | Status | Record progress | `toggle AM1`, `set AM1 APPROVED`, `reset` |
//! | Transfer | Move progress around | `export -o backup.json`, `import backup.json` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logging on stderr:
//! ```bash
//! subjects-graph --verbose show
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod query;
mod session;
mod status;
mod transfer;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
