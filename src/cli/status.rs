//! Commands that change saved state (use, toggle, set, reset)

use anyhow::{bail, Context, Result};

use super::output::Output;
use super::session::Session;
use crate::domain::{CurriculumGraph, StatusId};

/// Remember `variant` as the one to use from now on
pub fn select(output: &Output, session: &Session, variant: &str) -> Result<()> {
    let variant = session.catalog.variant(variant)?;
    session
        .store
        .select_variant(&variant.id)
        .context("Failed to save selected variant")?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "variant": variant.id,
            "name": variant.name,
        }));
    } else {
        output.success(&format!("Now using {} ({})", variant.name, variant.id));
    }
    Ok(())
}

fn require_subject(graph: &CurriculumGraph, id: &str) -> Result<()> {
    match graph.node(id) {
        None => bail!("Unknown subject: {}", id),
        Some(node) if node.node().as_subject().is_none() => {
            bail!("'{}' is a connector and has no status", id)
        }
        Some(_) => Ok(()),
    }
}

fn report(output: &Output, graph: &CurriculumGraph, id: &str) -> Result<()> {
    let node = graph.node(id).context("subject disappeared from graph")?;
    let subject = node.node().as_subject().context("not a subject")?;
    let status = graph.scales().status(&subject.status);
    let availability = node.availability();

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": subject.id,
            "status": status.id,
            "availability": availability.id,
        }));
    } else {
        output.success(&format!(
            "{}: {} ({})",
            subject.id,
            display_name(status.id.as_str(), &status.name),
            display_name(availability.id.as_str(), &availability.name),
        ));
    }
    Ok(())
}

fn display_name<'a>(id: &'a str, name: &'a str) -> &'a str {
    if name.is_empty() {
        id
    } else {
        name
    }
}

/// Move a subject to its next status
pub fn toggle(output: &Output, session: &Session, id: &str) -> Result<()> {
    let mut graph = session.graph()?;
    require_subject(&graph, id)?;

    if graph.toggle_status(id) {
        session.save(&graph)?;
        output.verbose_ctx("toggle", &format!("Saved progress for {}", session.variant.id));
    }
    report(output, &graph, id)
}

/// Put a subject in a specific status
pub fn set(output: &Output, session: &Session, id: &str, status: &str) -> Result<()> {
    let mut graph = session.graph()?;
    require_subject(&graph, id)?;

    let status = StatusId::new(status);
    if graph.scales().find_status_rank(&status).is_none() {
        let known: Vec<_> = graph.scales().statuses().iter().map(|s| s.id.as_str()).collect();
        bail!("Unknown status '{}'. Expected one of: {}", status, known.join(", "));
    }

    if graph.set_status(id, status) {
        session.save(&graph)?;
        output.verbose_ctx("set", &format!("Saved progress for {}", session.variant.id));
    }
    report(output, &graph, id)
}

/// Forget all saved progress of the active variant
pub fn reset(output: &Output, session: &Session) -> Result<()> {
    let removed = session
        .store
        .remove(&session.variant.id)
        .with_context(|| format!("Failed to reset variant '{}'", session.variant.id))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "variant": session.variant.id,
            "reset": removed,
        }));
    } else if removed {
        output.success(&format!("Cleared progress for {}", session.variant.id));
    } else {
        output.success(&format!("No saved progress for {}", session.variant.id));
    }
    Ok(())
}
