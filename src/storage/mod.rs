//! # Storage Layer
//!
//! Everything that touches the filesystem.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Catalog | JSON | wherever `--catalog` / `catalog` points |
//! | Progress | JSON object, one file per variant | `{data_dir}/{variant}.json` |
//! | Selected variant | plain text | `{data_dir}/selected-variant` |
//! | Config | TOML | `.subjects-graph.toml` (project), `config.toml` (global) |
//!
//! ## Concurrency Safety
//!
//! - [`ProgressStore`] uses file locking (`fs2`)
//! - All writes are atomic (temp file + rename)

mod catalog;
mod config;
mod progress;

pub use catalog::{Catalog, CatalogError, Variant};
pub use config::{Config, ConfigError, OutputFormat, Settings, DATA_DIR_ENV, PROJECT_CONFIG_FILE};
pub use progress::{saved_statuses, ProgressError, ProgressExport, ProgressStore, Statuses};
