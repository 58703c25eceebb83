//! Configuration handling
//!
//! Configuration is read from `~/.config/subjects-graph/config.toml` (global)
//! and from the nearest `.subjects-graph.toml` found walking up from the
//! current directory (project). Project values win over global ones.
//! Relative paths in a project file are relative to the directory holding it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const PROJECT_CONFIG_FILE: &str = ".subjects-graph.toml";
pub const DATA_DIR_ENV: &str = "SUBJECTS_GRAPH_DATA_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Could not determine a data directory; set SUBJECTS_GRAPH_DATA_DIR or `data_dir`")]
    NoDataDir,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings that can appear in either config file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Catalog JSON file
    pub catalog: Option<PathBuf>,

    /// Variant to use when none was selected
    pub variant: Option<String>,

    /// Where progress files are kept
    pub data_dir: Option<PathBuf>,

    pub default_format: Option<OutputFormat>,
}

impl Settings {
    /// Reads a settings file; a missing file yields defaults
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let settings = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), "config loaded");
        Ok(settings)
    }

    /// Values from `other` win wherever they are set
    pub fn overridden_by(self, other: Settings) -> Self {
        Self {
            catalog: other.catalog.or(self.catalog),
            variant: other.variant.or(self.variant),
            data_dir: other.data_dir.or(self.data_dir),
            default_format: other.default_format.or(self.default_format),
        }
    }

    fn relative_to(mut self, base: &Path) -> Self {
        self.catalog = self.catalog.map(|p| base.join(p));
        self.data_dir = self.data_dir.map(|p| base.join(p));
        self
    }
}

/// Combined configuration (global + project)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: Settings,
    pub project_file: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let global = Self::global_config_dir().map(|dir| dir.join("config.toml"));
        Self::load_from(global.as_deref(), &cwd)
    }

    /// Loads the global file (if any) and the project file nearest to `start`
    pub fn load_from(global_file: Option<&Path>, start: &Path) -> Result<Self> {
        let global = match global_file {
            Some(path) => Settings::read(path).context("Failed to load global config")?,
            None => Settings::default(),
        };

        let project_file = Self::find_project_file(start);
        let settings = match &project_file {
            Some(path) => {
                let base = path.parent().unwrap_or(start);
                let project = Settings::read(path)
                    .context("Failed to load project config")?
                    .relative_to(base);
                global.overridden_by(project)
            }
            None => global,
        };

        Ok(Self {
            settings,
            project_file,
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Finds the nearest project config file at or above `start`
    pub fn find_project_file(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join(PROJECT_CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Progress directory: `SUBJECTS_GRAPH_DATA_DIR`, then `data_dir`, then
    /// the platform data directory
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = &self.settings.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(ConfigError::NoDataDir)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "subjects-graph", "subjects-graph")
}
