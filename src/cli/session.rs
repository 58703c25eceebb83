//! The catalog, variant and progress store a command works against

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::CurriculumGraph;
use crate::storage::{Catalog, Config, ProgressStore, Variant};

/// Locations given on the command line; each one wins over the config
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub catalog: Option<PathBuf>,
    pub variant: Option<String>,
    pub data_dir: Option<PathBuf>,
}

pub struct Session {
    pub catalog: Catalog,
    pub variant: Variant,
    pub store: ProgressStore,
}

impl Session {
    /// Loads the catalog and picks the active variant
    ///
    /// The variant is, in order: `--variant`, the one selected with `use`,
    /// the config's `variant`, the catalog default.
    pub fn open(overrides: &Overrides, config: &Config, output: &Output) -> Result<Self> {
        let catalog_path = overrides
            .catalog
            .clone()
            .or_else(|| config.settings.catalog.clone())
            .context("No catalog configured. Pass --catalog or set `catalog` in .subjects-graph.toml")?;

        let catalog = Catalog::load(&catalog_path)
            .with_context(|| format!("Failed to load catalog: {}", catalog_path.display()))?;
        output.verbose_ctx("session", &format!("Loaded catalog: {}", catalog_path.display()));

        let data_dir = match &overrides.data_dir {
            Some(dir) => dir.clone(),
            None => config.data_dir()?,
        };
        output.verbose_ctx("session", &format!("Data directory: {}", data_dir.display()));
        let store = ProgressStore::new(data_dir);

        let selected = store
            .selected_variant()
            .context("Failed to read selected variant")?;
        let fallback = selected.as_deref().or(config.settings.variant.as_deref());
        let variant = catalog
            .resolve_variant(overrides.variant.as_deref(), fallback)?
            .clone();
        output.verbose_ctx("session", &format!("Active variant: {}", variant.id));

        Ok(Self {
            catalog,
            variant,
            store,
        })
    }

    /// Builds the active variant's graph with saved progress applied
    pub fn graph(&self) -> Result<CurriculumGraph> {
        let saved = self
            .store
            .load(&self.variant.id)
            .with_context(|| format!("Failed to load progress for variant '{}'", self.variant.id))?;
        Ok(self.variant.build_graph(&saved)?)
    }

    /// Persists whatever in `graph` moved off its starting status
    pub fn save(&self, graph: &CurriculumGraph) -> Result<()> {
        self.store
            .save_graph(&self.variant, graph)
            .with_context(|| format!("Failed to save progress for variant '{}'", self.variant.id))
    }
}
