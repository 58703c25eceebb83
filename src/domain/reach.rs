//! Cycle-safe reachability over the dependency links
//!
//! Every traversal carries a visited set: a node seen before contributes
//! nothing, so cyclic input terminates after at most one visit per node.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use super::graph::CurriculumGraph;
use super::node::NodeKind;

impl CurriculumGraph {
    /// True if `target` is `node` itself or is reachable through the links
    /// that are currently drawn
    pub(super) fn depends_on(
        &self,
        node: NodeIndex,
        target: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        if node == target {
            return true;
        }
        if !visited.insert(node) {
            return false;
        }
        self.display_dependencies(node)
            .into_iter()
            .any(|(_, dep)| self.depends_on(dep, target, visited))
    }

    /// True if subject `subject_id` is `node` or upstream of it, with a
    /// status ranked at least `required_rank`
    ///
    /// Walks every wired link: reduction only affects what is drawn.
    pub(super) fn satisfies(
        &self,
        node: NodeIndex,
        subject_id: &str,
        required_rank: usize,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        if let NodeKind::Subject(subject) = self.node_at(node).kind() {
            if subject.id == subject_id {
                return self.scales().status_rank(&subject.status) >= required_rank;
            }
        }
        if !visited.insert(node) {
            return false;
        }
        self.dependencies(node)
            .any(|dep| self.satisfies(dep, subject_id, required_rank, visited))
    }

    /// Ids of every subject reachable from `node`, `node` included when it
    /// is a subject
    pub(super) fn reachable_subject_ids(&self, node: NodeIndex) -> HashSet<&str> {
        let mut ids = HashSet::new();
        self.collect_subject_ids(node, &mut HashSet::new(), &mut ids);
        ids
    }

    /// Ids of every subject `node` asks for; a connector asks for whatever
    /// its targets ask for
    pub(super) fn required_subject_ids(&self, node: NodeIndex) -> HashSet<&str> {
        let mut ids = HashSet::new();
        self.collect_required_ids(node, &mut HashSet::new(), &mut ids);
        ids
    }

    fn collect_required_ids<'g>(
        &'g self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        ids: &mut HashSet<&'g str>,
    ) {
        if !visited.insert(node) {
            return;
        }
        match self.node_at(node).kind() {
            NodeKind::Subject(subject) => ids.extend(subject.required_subject_ids()),
            NodeKind::Connector(connector) => {
                for &target in &connector.targets {
                    self.collect_required_ids(target, visited, ids);
                }
            }
        }
    }

    fn collect_subject_ids<'g>(
        &'g self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        ids: &mut HashSet<&'g str>,
    ) {
        if let NodeKind::Subject(subject) = self.node_at(node).kind() {
            ids.insert(subject.id.as_str());
        }
        if !visited.insert(node) {
            return;
        }
        for dep in self.dependencies(node) {
            self.collect_subject_ids(dep, visited, ids);
        }
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
                Status::new("APPROVED", "Approved", "#3b82f6"),
            ],
            vec![
                Availability::new("NOT_AVAILABLE", "Not available", "#6b7280"),
                Availability::new("AVAILABLE", "Available", "#22c55e"),
            ],
        )
        .unwrap()
    }

    fn needs(id: &str, status: &str, deps: &[&str]) -> Subject {
        let subject = Subject::new(id, id).with_status(status);
        if deps.is_empty() {
            return subject;
        }
        subject.with_prerequisite(Prerequisite::new(
            "AVAILABLE",
            vec![DependencyGroup::new("APPROVED", deps.iter().copied())],
        ))
    }

    #[test]
    fn reachable_ids_include_self_and_upstream() {
        let graph = CurriculumGraph::new(
            scales(),
            vec![
                needs("A", "APPROVED", &[]),
                needs("B", "INACTIVE", &["A"]),
                needs("C", "INACTIVE", &["B"]),
                needs("D", "INACTIVE", &[]),
            ],
            vec![],
        );

        let mut ids: Vec<_> = graph.node("C").unwrap().reachable_subject_ids().into_iter().collect();
        ids.sort();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn connectors_are_transparent_to_reachability() {
        let graph = CurriculumGraph::new(
            scales(),
            vec![
                needs("A", "APPROVED", &[]),
                needs("B", "INACTIVE", &[]),
                needs("C", "INACTIVE", &[]),
            ],
            vec![
                Connector::new("c1", ["A"], ["c2"]),
                Connector::new("c2", ["c1", "B"], ["C"]),
            ],
        );

        let mut ids: Vec<_> = graph.node("c2").unwrap().reachable_subject_ids().into_iter().collect();
        ids.sort();
        assert_eq!(ids, vec!["A", "B"]);

        let c = graph.node("C").unwrap();
        assert!(c.satisfies("A", &"APPROVED".into()));
        assert!(!c.satisfies("B", &"APPROVED".into()));
        assert!(c.satisfies("B", &"INACTIVE".into()));
    }

    #[test]
    fn satisfies_checks_own_status_first() {
        let graph = CurriculumGraph::new(scales(), vec![needs("A", "APPROVED", &[])], vec![]);
        let a = graph.node("A").unwrap();
        assert!(a.satisfies("A", &"APPROVED".into()));
        assert!(!a.satisfies("Z", &"INACTIVE".into()));
    }

    #[test]
    fn traversals_terminate_on_cycles() {
        let graph = CurriculumGraph::new(
            scales(),
            vec![
                needs("A", "INACTIVE", &["C"]),
                needs("B", "INACTIVE", &["A"]),
                needs("C", "INACTIVE", &["B"]),
            ],
            vec![],
        );

        let a = graph.node("A").unwrap();
        assert!(!a.satisfies("MISSING", &"INACTIVE".into()));
        assert_eq!(a.reachable_subject_ids().len(), 3);
        assert_eq!(graph.display_links().len(), 3);
    }
}
