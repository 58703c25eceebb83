//! Saved progress
//!
//! Each variant's progress is stored as `{data_dir}/{variant}.json`, a JSON
//! object mapping subject id to status id. Only subjects that moved off the
//! status they start in are written. The selected variant lives next to them in
//! `selected-variant`.
//!
//! Reads take a shared lock, writes go to a temp file under an exclusive lock
//! and are renamed into place.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::catalog::Variant;
use crate::domain::{CurriculumGraph, StatusId};

const SELECTED_VARIANT_FILE: &str = "selected-variant";

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("Invalid variant id: {0}")]
    InvalidVariant(String),

    #[error("Invalid progress file format: {0}")]
    InvalidFormat(String),

    #[error("No saved progress to export for variant '{0}'")]
    NothingToExport(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ProgressError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Subject id -> status id
pub type Statuses = BTreeMap<String, StatusId>;

/// Snapshot of the statuses worth saving: every subject that moved off the
/// status it starts in
///
/// Subjects missing from `starting` are measured against the first status.
pub fn saved_statuses(graph: &CurriculumGraph, starting: &Statuses) -> Statuses {
    let default_status = &graph.scales().default_status().id;
    graph
        .subject_statuses()
        .filter(|(id, status)| starting.get(*id).unwrap_or(default_status) != *status)
        .map(|(id, status)| (id.to_string(), status.clone()))
        .collect()
}

/// Portable progress file, as written by `export` and read by `import`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressExport {
    pub variant: String,
    pub statuses: Statuses,
}

impl ProgressExport {
    pub fn to_json(&self) -> Result<String, ProgressError> {
        serde_json::to_string_pretty(self).map_err(|e| ProgressError::InvalidFormat(e.to_string()))
    }

    /// Parses an export file; `statuses` must be an object of strings
    pub fn from_json(json: &str) -> Result<Self, ProgressError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| ProgressError::InvalidFormat(e.to_string()))?;

        if !value.get("statuses").is_some_and(serde_json::Value::is_object) {
            return Err(ProgressError::InvalidFormat(
                "missing or invalid statuses object".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(|e| ProgressError::InvalidFormat(e.to_string()))
    }
}

/// Store for saved progress, one file per variant
pub struct ProgressStore {
    dir: PathBuf,
}

impl ProgressStore {
    /// Creates a store rooted at `dir`; nothing is created until the first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn variant_path(&self, variant: &str) -> Result<PathBuf, ProgressError> {
        if variant.is_empty()
            || variant.contains('/')
            || variant.contains('\\')
            || variant.contains("..")
        {
            return Err(ProgressError::InvalidVariant(variant.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", variant)))
    }

    /// Reads the saved statuses of a variant; a missing file is no progress
    pub fn load(&self, variant: &str) -> Result<Statuses, ProgressError> {
        let path = self.variant_path(variant)?;
        if !path.exists() {
            return Ok(Statuses::new());
        }

        let file = File::open(&path).map_err(|e| ProgressError::io(&path, e))?;
        file.lock_shared().map_err(|e| ProgressError::io(&path, e))?;

        let statuses: Statuses = serde_json::from_reader(BufReader::new(&file))
            .map_err(|e| ProgressError::InvalidFormat(format!("{}: {}", path.display(), e)))?;

        debug!(variant, subjects = statuses.len(), "progress loaded");
        Ok(statuses)
    }

    /// Replaces the saved statuses of a variant
    pub fn save(&self, variant: &str, statuses: &Statuses) -> Result<(), ProgressError> {
        let path = self.variant_path(variant)?;
        let json = serde_json::to_string_pretty(statuses)
            .map_err(|e| ProgressError::InvalidFormat(e.to_string()))?;
        self.write_atomic(&path, json.as_bytes())?;

        debug!(variant, subjects = statuses.len(), "progress saved");
        Ok(())
    }

    /// Saves whatever in `graph` moved off the variant's starting statuses
    pub fn save_graph(
        &self,
        variant: &Variant,
        graph: &CurriculumGraph,
    ) -> Result<(), ProgressError> {
        let starting = variant.starting_statuses();
        self.save(&variant.id, &saved_statuses(graph, &starting))
    }

    /// Deletes the saved progress of a variant; returns whether there was any
    pub fn remove(&self, variant: &str) -> Result<bool, ProgressError> {
        let path = self.variant_path(variant)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| ProgressError::io(&path, e))?;
        Ok(true)
    }

    /// Wraps the saved statuses of a variant for export
    pub fn export(&self, variant: &str) -> Result<ProgressExport, ProgressError> {
        let statuses = self.load(variant)?;
        if statuses.is_empty() {
            return Err(ProgressError::NothingToExport(variant.to_string()));
        }
        Ok(ProgressExport {
            variant: variant.to_string(),
            statuses,
        })
    }

    /// Replaces the saved statuses of `variant` with an export's
    pub fn import(&self, variant: &str, export: &ProgressExport) -> Result<(), ProgressError> {
        if export.variant != variant {
            warn!(
                file = export.variant.as_str(),
                active = variant,
                "importing progress saved for another variant"
            );
        }
        self.save(variant, &export.statuses)
    }

    /// The variant picked last time, if any
    pub fn selected_variant(&self) -> Result<Option<String>, ProgressError> {
        let path = self.dir.join(SELECTED_VARIANT_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| ProgressError::io(&path, e))?;
        let id = content.trim();
        Ok((!id.is_empty()).then(|| id.to_string()))
    }

    pub fn select_variant(&self, variant: &str) -> Result<(), ProgressError> {
        self.variant_path(variant)?;
        let path = self.dir.join(SELECTED_VARIANT_FILE);
        self.write_atomic(&path, variant.as_bytes())
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), ProgressError> {
        fs::create_dir_all(&self.dir).map_err(|e| ProgressError::io(&self.dir, e))?;

        let temp_path = temp_path(path);
        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| ProgressError::io(&temp_path, e))?;

            file.lock_exclusive()
                .map_err(|e| ProgressError::io(&temp_path, e))?;

            let mut writer = BufWriter::new(&file);
            writer
                .write_all(bytes)
                .and_then(|_| writer.flush())
                .map_err(|e| ProgressError::io(&temp_path, e))?;
        }

        fs::rename(&temp_path, path).map_err(|e| ProgressError::io(path, e))
    }
}

/// `{file_name}.tmp` next to `path`, so files differing only in extension
/// never share a temp file
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Availability, Scales, Status, Subject};
    use crate::storage::Catalog;
    use tempfile::TempDir;

    fn statuses(pairs: &[(&str, &str)]) -> Statuses {
        pairs
            .iter()
            .map(|(id, status)| (id.to_string(), StatusId::new(*status)))
            .collect()
    }

    #[test]
    fn load_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path());
        assert!(store.load("k23").unwrap().is_empty());
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path().join("nested"));

        let saved = statuses(&[("I1", "APPROVED"), ("AM1", "PENDING")]);
        store.save("k23", &saved).unwrap();

        assert_eq!(store.load("k23").unwrap(), saved);
        assert!(store.load("k08").unwrap().is_empty());
        assert!(!dir.path().join("nested").join("k23.json.tmp").exists());
    }

    fn two_status_scales() -> Scales {
        Scales::new(
            vec![
                Status::new("INACTIVE", "Not started", "#111827"),
                Status::new("APPROVED", "Approved", "#3b82f6"),
            ],
            vec![Availability::new("AVAILABLE", "Available", "#22c55e")],
        )
        .unwrap()
    }

    #[test]
    fn saved_statuses_skip_starting_status() {
        let graph = CurriculumGraph::new(
            two_status_scales(),
            vec![
                Subject::new("A", "A").with_status("APPROVED"),
                Subject::new("B", "B").with_status("INACTIVE"),
                Subject::new("C", "C").with_status("INACTIVE"),
            ],
            vec![],
        );

        // C starts approved, so being inactive is progress worth keeping
        let starting = statuses(&[("B", "INACTIVE"), ("C", "APPROVED")]);
        assert_eq!(
            saved_statuses(&graph, &starting),
            statuses(&[("A", "APPROVED"), ("C", "INACTIVE")])
        );
    }

    #[test]
    fn toggle_back_to_first_status_survives_reload() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path());
        let catalog = Catalog::from_json(
            r##"{
                "defaultVariant": "k23",
                "variants": {
                    "k23": {
                        "name": "Plan 2023",
                        "statuses": [{"id": "INACTIVE", "color": "#111827"}, {"id": "APPROVED", "color": "#3b82f6"}],
                        "availabilities": [{"id": "AVAILABLE", "color": "#22c55e"}],
                        "subjects": [
                            {"id": "I1", "name": "English I"},
                            {"id": "I2", "name": "English II", "status": "APPROVED"}
                        ]
                    }
                }
            }"##,
        )
        .unwrap();
        let variant = catalog.variant("k23").unwrap();

        let mut graph = variant.build_graph(&store.load("k23").unwrap()).unwrap();
        assert!(graph.toggle_status("I2"));
        store.save_graph(variant, &graph).unwrap();
        assert_eq!(store.load("k23").unwrap(), statuses(&[("I2", "INACTIVE")]));

        let reloaded = variant.build_graph(&store.load("k23").unwrap()).unwrap();
        let i2 = reloaded.node("I2").unwrap();
        assert_eq!(i2.node().as_subject().unwrap().status, StatusId::new("INACTIVE"));

        // Back at its catalog status, nothing needs saving
        let mut graph = reloaded;
        assert!(graph.toggle_status("I2"));
        store.save_graph(variant, &graph).unwrap();
        assert!(store.load("k23").unwrap().is_empty());
    }

    #[test]
    fn temp_files_never_collide() {
        let dir = Path::new("data");
        assert_eq!(temp_path(&dir.join("k23.json")), dir.join("k23.json.tmp"));
        assert_ne!(
            temp_path(&dir.join("selected-variant")),
            temp_path(&dir.join("selected-variant.json"))
        );
    }

    #[test]
    fn variant_named_like_selection_file_is_independent() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path());

        store.select_variant("k08").unwrap();
        store
            .save("selected-variant", &statuses(&[("I1", "APPROVED")]))
            .unwrap();

        assert_eq!(store.selected_variant().unwrap().as_deref(), Some("k08"));
        assert_eq!(
            store.load("selected-variant").unwrap(),
            statuses(&[("I1", "APPROVED")])
        );
    }

    #[test]
    fn rejects_path_like_variants() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path());

        for variant in ["../escape", "a/b", "a\\b", ""] {
            assert!(matches!(
                store.load(variant),
                Err(ProgressError::InvalidVariant(_))
            ));
        }
    }

    #[test]
    fn remove_progress() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path());

        assert!(!store.remove("k23").unwrap());
        store.save("k23", &statuses(&[("I1", "APPROVED")])).unwrap();
        assert!(store.remove("k23").unwrap());
        assert!(store.load("k23").unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_invalid_format() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("k23.json"), "[1, 2]").unwrap();

        let store = ProgressStore::new(dir.path());
        assert!(matches!(store.load("k23"), Err(ProgressError::InvalidFormat(_))));
    }

    #[test]
    fn selected_variant_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path());

        assert_eq!(store.selected_variant().unwrap(), None);
        store.select_variant("k08").unwrap();
        assert_eq!(store.selected_variant().unwrap().as_deref(), Some("k08"));
        assert!(store.select_variant("../x").is_err());
    }

    #[test]
    fn export_requires_progress() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path());

        assert!(matches!(
            store.export("k23"),
            Err(ProgressError::NothingToExport(_))
        ));

        store.save("k23", &statuses(&[("I1", "APPROVED")])).unwrap();
        let export = store.export("k23").unwrap();
        assert_eq!(export.variant, "k23");
        assert_eq!(export.statuses.len(), 1);
    }

    #[test]
    fn import_into_active_variant() {
        let dir = TempDir::new().unwrap();
        let store = ProgressStore::new(dir.path());
        store.save("k08", &statuses(&[("OLD", "APPROVED")])).unwrap();

        let export = ProgressExport {
            variant: "k23".to_string(),
            statuses: statuses(&[("I1", "PENDING")]),
        };
        store.import("k08", &export).unwrap();

        assert_eq!(store.load("k08").unwrap(), statuses(&[("I1", "PENDING")]));
        assert!(store.load("k23").unwrap().is_empty());
    }

    #[test]
    fn export_json_shape() {
        let export = ProgressExport {
            variant: "k23".to_string(),
            statuses: statuses(&[("I1", "APPROVED")]),
        };
        let value: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();
        assert_eq!(value["variant"], "k23");
        assert_eq!(value["statuses"]["I1"], "APPROVED");

        assert_eq!(ProgressExport::from_json(&export.to_json().unwrap()).unwrap(), export);
    }

    #[test]
    fn import_rejects_bad_envelopes() {
        for json in [
            "not json",
            r#"{"variant": "k23"}"#,
            r#"{"variant": "k23", "statuses": ["I1"]}"#,
            r#"{"variant": "k23", "statuses": "APPROVED"}"#,
        ] {
            assert!(
                matches!(ProgressExport::from_json(json), Err(ProgressError::InvalidFormat(_))),
                "accepted {}",
                json
            );
        }
    }
}
