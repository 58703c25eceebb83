//! Graph vertices
//!
//! A node wraps either a [`Subject`] or a [`Connector`]. The shared graph
//! algorithms (reduction, leaf marking, reachability) live on
//! [`CurriculumGraph`] and only ever look at a node through [`NodeKind`].

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use super::connector::Connector;
use super::graph::CurriculumGraph;
use super::scale::{Availability, StatusId};
use super::subject::{Position, Subject};

/// The two kinds of vertex
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Subject(Subject),
    Connector(ConnectorNode),
}

/// A connector plus the targets that resolved during wiring
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorNode {
    pub connector: Connector,
    pub(super) targets: Vec<NodeIndex>,
}

impl ConnectorNode {
    /// A connector with one declared source and one resolved target only
    /// routes an arrow through a bend point
    pub fn is_pass_through(&self) -> bool {
        self.connector.dependency_ids.len() == 1 && self.targets.len() == 1
    }
}

/// A vertex of the curriculum graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    is_leaf: bool,
}

impl Node {
    pub(super) fn subject(subject: Subject) -> Self {
        Self {
            kind: NodeKind::Subject(subject),
            is_leaf: true,
        }
    }

    pub(super) fn connector(connector: Connector) -> Self {
        Self {
            kind: NodeKind::Connector(ConnectorNode {
                connector,
                targets: Vec::new(),
            }),
            is_leaf: true,
        }
    }

    pub fn id(&self) -> &str {
        match &self.kind {
            NodeKind::Subject(s) => &s.id,
            NodeKind::Connector(c) => &c.connector.id,
        }
    }

    pub fn position(&self) -> Position {
        match &self.kind {
            NodeKind::Subject(s) => s.position,
            NodeKind::Connector(c) => c.connector.position,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub(super) fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn as_subject(&self) -> Option<&Subject> {
        match &self.kind {
            NodeKind::Subject(s) => Some(s),
            NodeKind::Connector(_) => None,
        }
    }

    pub fn as_connector(&self) -> Option<&ConnectorNode> {
        match &self.kind {
            NodeKind::Subject(_) => None,
            NodeKind::Connector(c) => Some(c),
        }
    }

    /// True when no other node depends on this one in the simplified graph
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    pub(super) fn set_leaf(&mut self, is_leaf: bool) {
        self.is_leaf = is_leaf;
    }

    /// Ids this node declares it depends on, and ids it declares it feeds
    pub(super) fn declared_links(&self) -> (Vec<String>, Vec<String>) {
        match &self.kind {
            NodeKind::Subject(s) => (
                s.required_subject_ids().map(str::to_owned).collect(),
                Vec::new(),
            ),
            NodeKind::Connector(c) => (
                c.connector.dependency_ids.clone(),
                c.connector.target_ids.clone(),
            ),
        }
    }
}

/// A borrowed node together with the graph it lives in
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'g> {
    graph: &'g CurriculumGraph,
    index: NodeIndex,
}

impl<'g> NodeRef<'g> {
    pub(super) fn new(graph: &'g CurriculumGraph, index: NodeIndex) -> Self {
        Self { graph, index }
    }

    pub fn node(&self) -> &'g Node {
        self.graph.node_at(self.index)
    }

    pub fn id(&self) -> &'g str {
        self.node().id()
    }

    pub fn kind(&self) -> &'g NodeKind {
        self.node().kind()
    }

    pub fn position(&self) -> Position {
        self.node().position()
    }

    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    /// Highest tier reached, considering every subject upstream of this node
    pub fn availability(&self) -> &'g Availability {
        let rank = self.graph.own_availability_rank(self.index);
        self.graph.scales().availability_at(rank)
    }

    /// Highest tier reached when only `scope` subjects are checked
    pub fn availability_within(&self, scope: &HashSet<&str>) -> &'g Availability {
        let rank = self.graph.availability_rank(self.index, scope);
        self.graph.scales().availability_at(rank)
    }

    /// True if `subject_id` is this subject, or upstream of it, and is at
    /// least at `status`
    pub fn satisfies(&self, subject_id: &str, status: &StatusId) -> bool {
        let required = self.graph.scales().status_rank(status);
        self.graph
            .satisfies(self.index, subject_id, required, &mut HashSet::new())
    }

    /// Ids of every subject reachable through the dependencies, this one included
    pub fn reachable_subject_ids(&self) -> HashSet<&'g str> {
        self.graph.reachable_subject_ids(self.index)
    }

    /// Direct dependencies that survived transitive reduction
    pub fn dependencies(&self) -> Vec<NodeRef<'g>> {
        self.graph
            .display_dependencies(self.index)
            .into_iter()
            .map(|(_, dep)| NodeRef::new(self.graph, dep))
            .collect()
    }
}
