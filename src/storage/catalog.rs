//! Curriculum catalog loading
//!
//! A catalog is a single JSON document holding every curriculum variant a
//! student can pick from, plus a shared color palette:
//!
//! ```json
//! {
//!   "defaultVariant": "k23",
//!   "colors": { "--fill-color-4": "#3b82f6" },
//!   "variants": {
//!     "k23": { "name": "...", "statuses": [], "availabilities": [], "subjects": [], "connectors": [] }
//!   }
//! }
//! ```
//!
//! Status and availability colors may name a palette entry; they are resolved
//! once, at load time.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{
    Availability, Connector, CurriculumGraph, ScaleError, Scales, Status, StatusId, Subject,
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    #[error("Default variant '{0}' is not defined in the catalog")]
    MissingDefaultVariant(String),

    #[error("Variant '{variant}' has invalid scales: {source}")]
    InvalidScales {
        variant: String,
        source: ScaleError,
    },
}

/// One curriculum: its scales, its subjects and the connectors between them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Key of the variant in the catalog, filled in at load time
    #[serde(skip)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub statuses: Vec<Status>,

    #[serde(default)]
    pub availabilities: Vec<Availability>,

    #[serde(default)]
    pub subjects: Vec<Subject>,

    #[serde(alias = "edges", default)]
    pub connectors: Vec<Connector>,
}

impl Variant {
    /// Validated status and availability scales
    pub fn scales(&self) -> Result<Scales, CatalogError> {
        Scales::new(self.statuses.clone(), self.availabilities.clone()).map_err(|source| {
            CatalogError::InvalidScales {
                variant: self.id.clone(),
                source,
            }
        })
    }

    /// Status each subject starts in before any progress is applied: its
    /// catalog status, or the first status when it has none
    pub fn starting_statuses(&self) -> BTreeMap<String, StatusId> {
        let default_status = self.statuses.first().map(|s| s.id.clone()).unwrap_or_default();
        self.subjects
            .iter()
            .map(|subject| {
                let status = if subject.status.as_str().is_empty() {
                    default_status.clone()
                } else {
                    subject.status.clone()
                };
                (subject.id.clone(), status)
            })
            .collect()
    }

    /// Subjects with saved statuses applied
    ///
    /// A saved status wins over the catalog's; subjects without either start
    /// in the first status. Saved ids that match no subject are skipped.
    pub fn subjects_with(&self, saved: &BTreeMap<String, StatusId>) -> Vec<Subject> {
        let default_status = self.statuses.first().map(|s| s.id.clone()).unwrap_or_default();

        for id in saved.keys() {
            if !self.subjects.iter().any(|s| &s.id == id) {
                debug!(
                    variant = self.id.as_str(),
                    subject = id.as_str(),
                    "saved status for unknown subject skipped"
                );
            }
        }

        self.subjects
            .iter()
            .cloned()
            .map(|mut subject| {
                if let Some(status) = saved.get(&subject.id) {
                    subject.status = status.clone();
                } else if subject.status.as_str().is_empty() {
                    subject.status = default_status.clone();
                }
                subject
            })
            .collect()
    }

    /// Builds the graph for this variant with saved statuses applied
    pub fn build_graph(
        &self,
        saved: &BTreeMap<String, StatusId>,
    ) -> Result<CurriculumGraph, CatalogError> {
        let scales = self.scales()?;
        Ok(CurriculumGraph::new(
            scales,
            self.subjects_with(saved),
            self.connectors.iter().cloned(),
        ))
    }

    fn resolve_colors(&mut self, palette: &HashMap<String, String>) {
        for status in &mut self.statuses {
            resolve_color(&mut status.color, palette);
            resolve_color(&mut status.text_color, palette);
            if let Some(leaf) = status.leaf_text_color.as_mut() {
                resolve_color(leaf, palette);
            }
        }
        for availability in &mut self.availabilities {
            resolve_color(&mut availability.color, palette);
        }
    }
}

fn resolve_color(color: &mut String, palette: &HashMap<String, String>) {
    if let Some(resolved) = palette.get(color.as_str()) {
        *color = resolved.clone();
    }
}

/// Every curriculum variant available to the student
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub default_variant: String,

    /// Palette of named colors referenced by the scales
    #[serde(default)]
    pub colors: HashMap<String, String>,

    pub variants: BTreeMap<String, Variant>,
}

impl Catalog {
    /// Loads a catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parses a catalog, resolving palette colors and checking the default variant
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let mut catalog: Catalog = serde_json::from_str(json)?;

        if !catalog.variants.contains_key(&catalog.default_variant) {
            return Err(CatalogError::MissingDefaultVariant(catalog.default_variant));
        }

        let palette = &catalog.colors;
        for (id, variant) in catalog.variants.iter_mut() {
            variant.id = id.clone();
            variant.resolve_colors(palette);
        }

        debug!(variants = catalog.variants.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Looks a variant up by id
    pub fn variant(&self, id: &str) -> Result<&Variant, CatalogError> {
        self.variants
            .get(id)
            .ok_or_else(|| CatalogError::UnknownVariant(id.to_string()))
    }

    pub fn default_variant(&self) -> Result<&Variant, CatalogError> {
        self.variant(&self.default_variant)
    }

    /// Picks the variant to work on
    ///
    /// An explicitly requested variant must exist. A previously selected one
    /// that no longer exists falls back to the default.
    pub fn resolve_variant(
        &self,
        requested: Option<&str>,
        selected: Option<&str>,
    ) -> Result<&Variant, CatalogError> {
        if let Some(id) = requested {
            return self.variant(id);
        }
        if let Some(id) = selected {
            match self.variants.get(id) {
                Some(variant) => return Ok(variant),
                None => warn!(variant = id, "selected variant not in catalog, using default"),
            }
        }
        self.default_variant()
    }
}
