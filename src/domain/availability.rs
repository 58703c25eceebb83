//! Availability computation
//!
//! A subject climbs the availability scale tier by tier: a tier counts only
//! if every tier below it also holds. A connector is only as available as the
//! least available node it feeds. An arrow shows what its source alone
//! contributes to its target.
//!
//! Every check is scoped to a set of subject ids. Requirement groups only
//! look at the subjects that are both required and in scope. An arrow whose
//! source shares no subject with what its target requires contributes
//! nothing and stays at the lowest tier; without that check every group would
//! be vacuously satisfied and the arrow would show the top tier.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use super::graph::CurriculumGraph;
use super::node::{ConnectorNode, NodeKind};
use super::subject::Subject;

impl CurriculumGraph {
    /// Rank reached by `node` considering everything upstream of it
    pub(super) fn own_availability_rank(&self, node: NodeIndex) -> usize {
        let scope = self.reachable_subject_ids(node);
        self.availability_rank(node, &scope)
    }

    /// Rank `from` contributes to `to`
    pub(super) fn link_availability_rank(&self, from: NodeIndex, to: NodeIndex) -> usize {
        let scope = self.reachable_subject_ids(from);
        if scope.is_disjoint(&self.required_subject_ids(to)) {
            return 0;
        }
        self.availability_rank(to, &scope)
    }

    /// Rank reached by `node` when only subjects in `scope` are checked
    pub(super) fn availability_rank(&self, node: NodeIndex, scope: &HashSet<&str>) -> usize {
        self.scoped_rank(node, scope, &mut HashSet::new())
    }

    fn scoped_rank(
        &self,
        node: NodeIndex,
        scope: &HashSet<&str>,
        evaluating: &mut HashSet<NodeIndex>,
    ) -> usize {
        match self.node_at(node).kind() {
            NodeKind::Subject(subject) => self.subject_rank(node, subject, scope),
            NodeKind::Connector(connector) => {
                self.connector_rank(node, connector, scope, evaluating)
            }
        }
    }

    /// Last tier, in scale order, whose groups all hold
    fn subject_rank(&self, node: NodeIndex, subject: &Subject, scope: &HashSet<&str>) -> usize {
        let scales = self.scales();
        let mut reached = 0;

        for (rank, tier) in scales.availabilities().iter().enumerate() {
            let holds = subject
                .prerequisites
                .iter()
                .filter(|p| p.availability_id == tier.id)
                .flat_map(|p| &p.dependency_groups)
                .all(|group| {
                    let required = scales.status_rank(&group.required_status);
                    group
                        .subject_ids
                        .iter()
                        .filter(|id| scope.contains(id.as_str()))
                        .all(|id| self.satisfies(node, id, required, &mut HashSet::new()))
                });

            if !holds {
                break;
            }
            reached = rank;
        }

        reached
    }

    /// Lowest rank among the connector's targets; the top tier when it has
    /// none
    fn connector_rank(
        &self,
        node: NodeIndex,
        connector: &ConnectorNode,
        scope: &HashSet<&str>,
        evaluating: &mut HashSet<NodeIndex>,
    ) -> usize {
        let top = self.scales().top_availability_rank();
        // A connector feeding back into itself through other connectors
        // does not constrain itself.
        if !evaluating.insert(node) {
            return top;
        }
        let rank = connector
            .targets
            .iter()
            .map(|&target| self.scoped_rank(target, scope, evaluating))
            .min()
            .unwrap_or(top);
        evaluating.remove(&node);
        rank
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{
        Availability, Connector, CurriculumGraph, DependencyGroup, Prerequisite, Scales, Status,
        Subject,
    };

    fn scales() -> Scales {
        Scales::new(
            vec![
                Status::new("INACTIVE", "Not started", "#111827"),
                Status::new("PENDING", "Pending final exam", "#2255d4"),
                Status::new("APPROVED", "Approved", "#3b82f6"),
            ],
            vec![
                Availability::new("NOT_AVAILABLE", "Not available", "gray"),
                Availability::new("ENROLL", "Can enroll", "green"),
                Availability::new("APPROVE", "Can approve", "blue"),
            ],
        )
        .unwrap()
    }

    fn subject(id: &str, status: &str) -> Subject {
        Subject::new(id, id).with_status(status)
    }

    fn tier(tier: &str, groups: &[(&str, &[&str])]) -> Prerequisite {
        Prerequisite::new(
            tier,
            groups
                .iter()
                .map(|(status, ids)| DependencyGroup::new(*status, ids.iter().copied()))
                .collect(),
        )
    }

    fn availability(graph: &CurriculumGraph, id: &str) -> String {
        graph.availability(id).unwrap().id.to_string()
    }

    #[test]
    fn subject_without_prerequisites_is_at_top() {
        let graph = CurriculumGraph::new(scales(), vec![subject("A", "INACTIVE")], vec![]);
        assert_eq!(availability(&graph, "A"), "APPROVE");
    }

    #[test]
    fn tiers_are_cumulative() {
        // ENROLL fails, APPROVE would pass on its own
        let b = subject("B", "INACTIVE")
            .with_prerequisite(tier("ENROLL", &[("APPROVED", &["A"])]))
            .with_prerequisite(tier("APPROVE", &[("INACTIVE", &["A"])]));
        let graph = CurriculumGraph::new(scales(), vec![subject("A", "PENDING"), b], vec![]);

        assert_eq!(availability(&graph, "B"), "NOT_AVAILABLE");
    }

    #[test]
    fn failing_first_tier_falls_back_to_lowest() {
        let b = subject("B", "INACTIVE")
            .with_prerequisite(tier("NOT_AVAILABLE", &[("APPROVED", &["A"])]));
        let graph = CurriculumGraph::new(scales(), vec![subject("A", "INACTIVE"), b], vec![]);

        assert_eq!(availability(&graph, "B"), "NOT_AVAILABLE");
    }

    #[test]
    fn intermediate_tier() {
        let b = subject("B", "INACTIVE")
            .with_prerequisite(tier("ENROLL", &[("PENDING", &["A"])]))
            .with_prerequisite(tier("APPROVE", &[("APPROVED", &["A"])]));
        let mut graph = CurriculumGraph::new(scales(), vec![subject("A", "PENDING"), b], vec![]);

        assert_eq!(availability(&graph, "B"), "ENROLL");
        graph.set_status("A", "APPROVED".into());
        assert_eq!(availability(&graph, "B"), "APPROVE");
    }

    #[test]
    fn all_groups_of_a_tier_must_hold() {
        let c = subject("C", "INACTIVE").with_prerequisite(tier(
            "ENROLL",
            &[("APPROVED", &["A"]), ("PENDING", &["B"])],
        ));
        let graph = CurriculumGraph::new(
            scales(),
            vec![subject("A", "APPROVED"), subject("B", "INACTIVE"), c],
            vec![],
        );

        assert_eq!(availability(&graph, "C"), "NOT_AVAILABLE");
    }

    #[test]
    fn arrow_reflects_what_its_source_contributes() {
        let c = subject("C", "INACTIVE")
            .with_prerequisite(tier("ENROLL", &[("APPROVED", &["A", "B"])]));
        let graph = CurriculumGraph::new(
            scales(),
            vec![subject("A", "APPROVED"), subject("B", "INACTIVE"), c],
            vec![],
        );

        assert_eq!(availability(&graph, "C"), "NOT_AVAILABLE");
        assert_eq!(graph.link_availability("A", "C").unwrap().id.as_str(), "APPROVE");
        assert_eq!(graph.link_availability("B", "C").unwrap().id.as_str(), "NOT_AVAILABLE");
    }

    #[test]
    fn connector_takes_minimum_of_targets() {
        let c = subject("C", "INACTIVE").with_prerequisite(tier("ENROLL", &[("APPROVED", &["A"])]));
        let d = subject("D", "INACTIVE").with_prerequisite(tier("ENROLL", &[("APPROVED", &["B"])]));
        let graph = CurriculumGraph::new(
            scales(),
            vec![subject("A", "APPROVED"), subject("B", "INACTIVE"), c, d],
            vec![Connector::new("x", ["A", "B"], ["C", "D"])],
        );

        assert_eq!(availability(&graph, "C"), "APPROVE");
        assert_eq!(availability(&graph, "D"), "NOT_AVAILABLE");
        assert_eq!(availability(&graph, "x"), "NOT_AVAILABLE");
    }

    #[test]
    fn connector_without_targets_is_at_top() {
        let graph = CurriculumGraph::new(
            scales(),
            vec![subject("A", "INACTIVE")],
            vec![Connector::new("x", ["A"], Vec::<String>::new())],
        );
        assert_eq!(availability(&graph, "x"), "APPROVE");
    }

    #[test]
    fn connector_loop_terminates() {
        let graph = CurriculumGraph::new(
            scales(),
            vec![subject("A", "INACTIVE")],
            vec![
                Connector::new("x", ["A"], ["y"]),
                Connector::new("y", ["x"], ["x"]),
            ],
        );
        assert_eq!(availability(&graph, "x"), "APPROVE");
        assert_eq!(availability(&graph, "y"), "APPROVE");
    }

    #[test]
    fn unmentioned_source_does_not_unlock_target() {
        // C only requires B, but Z is routed into C through a connector
        let c = subject("C", "INACTIVE")
            .with_prerequisite(tier("ENROLL", &[("APPROVED", &["B"])]));
        let graph = CurriculumGraph::new(
            scales(),
            vec![subject("B", "INACTIVE"), subject("Z", "APPROVED"), c],
            vec![Connector::new("x", ["Z"], ["C"])],
        );

        assert_eq!(graph.link_availability("Z", "x").unwrap().id.as_str(), "NOT_AVAILABLE");
        assert_eq!(graph.link_availability("x", "C").unwrap().id.as_str(), "NOT_AVAILABLE");
        assert_eq!(graph.link_availability("B", "C").unwrap().id.as_str(), "NOT_AVAILABLE");
    }

    #[test]
    fn partially_mentioned_source_reports_its_share() {
        // A covers ENROLL on its own; APPROVE only asks for B
        let c = subject("C", "INACTIVE")
            .with_prerequisite(tier("ENROLL", &[("APPROVED", &["A"])]))
            .with_prerequisite(tier("APPROVE", &[("APPROVED", &["B"])]));
        let graph = CurriculumGraph::new(
            scales(),
            vec![subject("A", "APPROVED"), subject("B", "INACTIVE"), c],
            vec![],
        );

        assert_eq!(availability(&graph, "C"), "ENROLL");
        assert_eq!(graph.link_availability("A", "C").unwrap().id.as_str(), "APPROVE");
        assert_eq!(graph.link_availability("B", "C").unwrap().id.as_str(), "NOT_AVAILABLE");
    }
}
