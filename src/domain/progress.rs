//! Completion summary of a curriculum

use serde::Serialize;

use super::graph::CurriculumGraph;
use super::scale::{Scales, StatusId};

/// How far along the curriculum a student is
///
/// A subject counts as approved when it sits at the last status of the
/// scale, and as pending when it sits at the second-to-last or above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
}

impl Progress {
    pub fn from_graph(graph: &CurriculumGraph) -> Self {
        Self::from_statuses(graph.scales(), graph.subject_statuses().map(|(_, s)| s))
    }

    pub fn from_statuses<'a, I>(scales: &Scales, statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a StatusId>,
    {
        let top = scales.top_status_rank();
        let pending_from = top.saturating_sub(1);

        statuses
            .into_iter()
            .map(|status| scales.status_rank(status))
            .fold(Self::default(), |mut progress, rank| {
                progress.total += 1;
                if rank >= top {
                    progress.approved += 1;
                }
                if rank >= pending_from {
                    progress.pending += 1;
                }
                progress
            })
    }

    pub fn approved_percent(&self) -> u32 {
        percent(self.approved, self.total)
    }

    pub fn pending_percent(&self) -> u32 {
        percent(self.pending, self.total)
    }
}

fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}
