//! Read-only commands (variants, show, available, progress)

use anyhow::{bail, Result};
use serde::Serialize;

use super::output::Output;
use super::session::Session;
use crate::domain::{AvailabilityId, CurriculumGraph, NodeRef, Progress};
use crate::scene::Scene;

/// One subject as listed by `show` and `available`
#[derive(Debug, Serialize)]
struct SubjectRow<'g> {
    id: &'g str,
    name: &'g str,
    status: &'g str,
    availability: &'g str,
}

fn subject_row<'g>(graph: &'g CurriculumGraph, node: NodeRef<'g>) -> Option<SubjectRow<'g>> {
    let subject = node.node().as_subject()?;
    Some(SubjectRow {
        id: &subject.id,
        name: &subject.name,
        status: graph.scales().status(&subject.status).id.as_str(),
        availability: node.availability().id.as_str(),
    })
}

fn print_rows(rows: &[SubjectRow<'_>]) {
    println!("{:<10} {:<40} {:<16} AVAILABILITY", "ID", "NAME", "STATUS");
    println!("{}", "-".repeat(84));
    for row in rows {
        println!(
            "{:<10} {:<40} {:<16} {}",
            row.id, row.name, row.status, row.availability
        );
    }
}

/// List the catalog's variants
pub fn variants(output: &Output, session: &Session) -> Result<()> {
    let selected = session.store.selected_variant()?;

    if output.is_json() {
        let items: Vec<_> = session
            .catalog
            .variants
            .values()
            .map(|v| {
                serde_json::json!({
                    "id": v.id,
                    "name": v.name,
                    "default": v.id == session.catalog.default_variant,
                    "selected": selected.as_deref() == Some(v.id.as_str()),
                    "active": v.id == session.variant.id,
                })
            })
            .collect();
        output.data(&items);
        return Ok(());
    }

    for variant in session.catalog.variants.values() {
        let marker = if variant.id == session.variant.id { "*" } else { " " };
        let default = if variant.id == session.catalog.default_variant {
            " (default)"
        } else {
            ""
        };
        println!("{} {:<12} {}{}", marker, variant.id, variant.name, default);
    }

    Ok(())
}

/// Render the active variant's graph
pub fn show(output: &Output, session: &Session) -> Result<()> {
    let graph = session.graph()?;
    output.verbose_ctx("show", &format!("Built graph with {} nodes", graph.len()));

    if output.is_json() {
        output.data(&Scene::capture(&graph));
        return Ok(());
    }

    let rows: Vec<_> = graph.nodes().filter_map(|n| subject_row(&graph, n)).collect();
    println!("{} ({})", session.variant.name, session.variant.id);
    println!();
    print_rows(&rows);
    println!();
    println!("{} subjects, {} links", rows.len(), graph.display_links().len());

    Ok(())
}

/// List subjects not yet finished that reached at least `at_least`
pub fn available(output: &Output, session: &Session, at_least: Option<&str>) -> Result<()> {
    let graph = session.graph()?;
    let scales = graph.scales();

    let min_rank = match at_least {
        Some(tier) => match scales.find_availability_rank(&AvailabilityId::new(tier)) {
            Some(rank) => rank,
            None => {
                let known: Vec<_> = scales.availabilities().iter().map(|a| a.id.as_str()).collect();
                bail!("Unknown availability '{}'. Expected one of: {}", tier, known.join(", "));
            }
        },
        None => scales.top_availability_rank(),
    };
    output.verbose_ctx("available", &format!("Minimum availability rank: {}", min_rank));

    let top_status = scales.top_status_rank();
    let rows: Vec<_> = graph
        .nodes()
        .filter(|n| {
            let Some(subject) = n.node().as_subject() else {
                return false;
            };
            scales.status_rank(&subject.status) < top_status
                && scales.availability_rank(&n.availability().id) >= min_rank
        })
        .filter_map(|n| subject_row(&graph, n))
        .collect();

    if output.is_json() {
        output.data(&rows);
    } else if rows.is_empty() {
        println!("No subjects available.");
    } else {
        println!("Available subjects ({}):", rows.len());
        print_rows(&rows);
    }

    Ok(())
}

/// Approved and pending percentages
pub fn progress(output: &Output, session: &Session) -> Result<()> {
    let graph = session.graph()?;
    let progress = Progress::from_graph(&graph);

    if output.is_json() {
        output.data(&serde_json::json!({
            "variant": session.variant.id,
            "total": progress.total,
            "approved": progress.approved,
            "pending": progress.pending,
            "approvedPercent": progress.approved_percent(),
            "pendingPercent": progress.pending_percent(),
        }));
        return Ok(());
    }

    println!("Progress for {} ({})", session.variant.name, session.variant.id);
    println!(
        "  Approved: {:>3}% ({}/{})",
        progress.approved_percent(),
        progress.approved,
        progress.total
    );
    println!(
        "  Pending:  {:>3}% ({}/{})",
        progress.pending_percent(),
        progress.pending,
        progress.total
    );

    Ok(())
}
