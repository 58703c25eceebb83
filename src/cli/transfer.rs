//! Progress export and import

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use super::session::Session;
use crate::storage::ProgressExport;

/// Write saved progress to `path`, or to stdout
pub fn export(output: &Output, session: &Session, path: Option<&Path>) -> Result<()> {
    let export = session.store.export(&session.variant.id)?;
    let json = export.to_json()?;

    match path {
        Some(path) => {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            output.success(&format!(
                "Exported {} statuses of {} to {}",
                export.statuses.len(),
                export.variant,
                path.display()
            ));
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Replace saved progress with the contents of an export file
pub fn import(output: &Output, session: &Session, path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    let export = ProgressExport::from_json(&content)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    let unknown = export
        .statuses
        .keys()
        .filter(|id| !session.variant.subjects.iter().any(|s| &s.id == *id))
        .count();
    output.verbose_ctx(
        "import",
        &format!("{} of {} statuses match no subject", unknown, export.statuses.len()),
    );

    session
        .store
        .import(&session.variant.id, &export)
        .with_context(|| format!("Failed to save progress for variant '{}'", session.variant.id))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "variant": session.variant.id,
            "imported": export.statuses.len(),
        }));
    } else {
        output.success(&format!(
            "Imported {} statuses into {}",
            export.statuses.len(),
            session.variant.id
        ));
    }
    Ok(())
}
