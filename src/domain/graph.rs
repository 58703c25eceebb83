//! Curriculum dependency graph
//!
//! Owns every node, wires dependency references once all nodes exist, prunes
//! redundant edges by transitive reduction and marks leaves. Uses petgraph
//! for storage; edges point from a dependency to the node that needs it.
//!
//! Construction never fails. Duplicate ids, dangling references and cycles
//! are logged and tolerated.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::{debug, warn};

use super::connector::Connector;
use super::node::{Node, NodeKind, NodeRef};
use super::render::{Arrow, Circle, Diamond, Joint, Renderer};
use super::scale::{Availability, Scales, StatusId};
use super::subject::Subject;

/// Edge weight: a dependency reference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Link {
    /// Pruned by transitive reduction. Redundant links still count for
    /// satisfaction, they are just never drawn.
    pub(super) redundant: bool,
}

/// The prerequisite graph of one curriculum
#[derive(Debug, Clone)]
pub struct CurriculumGraph {
    scales: Scales,

    /// Edge direction: dependency -> consumer
    graph: DiGraph<Node, Link>,

    /// Map from node id to node index
    node_map: HashMap<String, NodeIndex>,
}

impl CurriculumGraph {
    /// Builds the graph: one node per subject and connector, then wiring,
    /// transitive reduction and leaf marking, in that order
    pub fn new<S, C>(scales: Scales, subjects: S, connectors: C) -> Self
    where
        S: IntoIterator<Item = Subject>,
        C: IntoIterator<Item = Connector>,
    {
        let mut graph = Self {
            scales,
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        };

        for subject in subjects {
            graph.add_node(Node::subject(subject));
        }
        for connector in connectors {
            graph.add_node(Node::connector(connector));
        }

        graph.wire_dependencies();
        graph.report_unknown_scale_ids();
        graph.simplify();
        graph.mark_leaves();

        debug!(
            nodes = graph.graph.node_count(),
            links = graph.graph.edge_count(),
            drawn = graph.display_link_count(),
            "curriculum graph built"
        );

        graph
    }

    fn add_node(&mut self, node: Node) {
        if self.node_map.contains_key(node.id()) {
            warn!(id = node.id(), "node already exists in the graph, ignoring duplicate");
            return;
        }
        let id = node.id().to_string();
        let idx = self.graph.add_node(node);
        self.node_map.insert(id, idx);
    }

    /// Resolves declared ids into edges; unknown ids are skipped
    fn wire_dependencies(&mut self) {
        let indices: Vec<_> = self.graph.node_indices().collect();

        for idx in indices {
            let (dependency_ids, target_ids) = self.graph[idx].declared_links();

            for dep_id in &dependency_ids {
                match self.node_map.get(dep_id) {
                    Some(&dep) => {
                        self.graph.update_edge(dep, idx, Link::default());
                    }
                    None => warn!(
                        node = self.graph[idx].id(),
                        dependency = dep_id.as_str(),
                        "dependency not found in graph"
                    ),
                }
            }

            let mut targets = Vec::with_capacity(target_ids.len());
            for target_id in &target_ids {
                match self.node_map.get(target_id) {
                    Some(&target) => {
                        self.graph.update_edge(idx, target, Link::default());
                        targets.push(target);
                    }
                    None => warn!(
                        node = self.graph[idx].id(),
                        target = target_id.as_str(),
                        "connector target not found in graph"
                    ),
                }
            }

            if let NodeKind::Connector(c) = self.graph[idx].kind_mut() {
                c.targets = targets;
            }
        }
    }

    fn report_unknown_scale_ids(&self) {
        for subject in self.subjects() {
            if !subject.status.as_str().is_empty()
                && self.scales.find_status_rank(&subject.status).is_none()
            {
                warn!(
                    subject = subject.id.as_str(),
                    status = subject.status.as_str(),
                    "unknown status, using the first one"
                );
            }

            for prerequisite in &subject.prerequisites {
                if self
                    .scales
                    .find_availability_rank(&prerequisite.availability_id)
                    .is_none()
                {
                    warn!(
                        subject = subject.id.as_str(),
                        availability = prerequisite.availability_id.as_str(),
                        "prerequisite names an unknown availability and is ignored"
                    );
                }
                for group in &prerequisite.dependency_groups {
                    if self.scales.find_status_rank(&group.required_status).is_none() {
                        warn!(
                            subject = subject.id.as_str(),
                            status = group.required_status.as_str(),
                            "requirement names an unknown status, using the first one"
                        );
                    }
                }
            }
        }
    }

    /// Removes every direct link that is implied by an indirect path
    ///
    /// Running it again on an already simplified graph changes nothing.
    pub fn simplify(&mut self) {
        let indices: Vec<_> = self.graph.node_indices().collect();
        for idx in indices {
            for (edge, dependency) in self.display_dependencies(idx) {
                self.graph[edge].redundant = true;
                if !self.depends_on(idx, dependency, &mut HashSet::new()) {
                    self.graph[edge].redundant = false;
                } else {
                    debug!(
                        from = self.graph[dependency].id(),
                        to = self.graph[idx].id(),
                        "dropping redundant link"
                    );
                }
            }
        }
    }

    fn mark_leaves(&mut self) {
        let mut depended_on = HashSet::new();
        for edge in self.graph.edge_references() {
            if !edge.weight().redundant {
                depended_on.insert(edge.source());
            }
        }
        for idx in self.graph.node_indices() {
            self.graph[idx].set_leaf(!depended_on.contains(&idx));
        }
    }

    pub fn scales(&self) -> &Scales {
        &self.scales
    }

    /// Looks a node up by id
    pub fn node(&self, id: &str) -> Option<NodeRef<'_>> {
        self.node_map.get(id).map(|&idx| NodeRef::new(self, idx))
    }

    /// Returns true if the graph contains the node
    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Returns the number of nodes in the graph
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// All nodes, in the order they were registered
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.graph.node_indices().map(move |idx| NodeRef::new(self, idx))
    }

    pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
        self.graph.node_weights().filter_map(Node::as_subject)
    }

    /// Current status of every subject, for persistence
    pub fn subject_statuses(&self) -> impl Iterator<Item = (&str, &StatusId)> {
        self.subjects().map(|s| (s.id.as_str(), &s.status))
    }

    /// Availability of a node considering everything upstream of it
    pub fn availability(&self, id: &str) -> Option<&Availability> {
        self.node(id).map(|node| node.availability())
    }

    /// What `from` contributes to `to`, if a drawn link joins them
    pub fn link_availability(&self, from: &str, to: &str) -> Option<&Availability> {
        let from_idx = *self.node_map.get(from)?;
        let to_idx = *self.node_map.get(to)?;
        let edge = self.graph.find_edge(from_idx, to_idx)?;
        if self.graph[edge].redundant {
            return None;
        }
        let rank = self.link_availability_rank(from_idx, to_idx);
        Some(self.scales.availability_at(rank))
    }

    /// Links that survived reduction, as `(from, to)` id pairs
    pub fn display_links(&self) -> Vec<(&str, &str)> {
        self.graph
            .edge_references()
            .filter(|e| !e.weight().redundant)
            .map(|e| (self.graph[e.source()].id(), self.graph[e.target()].id()))
            .collect()
    }

    fn display_link_count(&self) -> usize {
        self.graph
            .edge_weights()
            .filter(|link| !link.redundant)
            .count()
    }

    /// Moves a subject to the next status, wrapping after the last
    ///
    /// Returns whether the graph needs to be rendered again. Connectors have
    /// no status, so toggling one is a no-op.
    pub fn toggle_status(&mut self, id: &str) -> bool {
        let Some(&idx) = self.node_map.get(id) else {
            warn!(id, "cannot toggle status of unknown node");
            return false;
        };
        let next = match self.graph[idx].as_subject() {
            Some(subject) => self.scales.next_status(&subject.status).id.clone(),
            None => {
                debug!(id, "connectors have no status to toggle");
                return false;
            }
        };
        self.apply_status(idx, next)
    }

    /// Sets a subject to a specific status
    ///
    /// Returns whether the graph needs to be rendered again.
    pub fn set_status(&mut self, id: &str, status: StatusId) -> bool {
        if self.scales.find_status_rank(&status).is_none() {
            warn!(id, status = status.as_str(), "cannot set unknown status");
            return false;
        }
        let Some(&idx) = self.node_map.get(id) else {
            warn!(id, "cannot set status of unknown node");
            return false;
        };
        if self.graph[idx].as_subject().is_none() {
            debug!(id, "connectors have no status to set");
            return false;
        }
        self.apply_status(idx, status)
    }

    fn apply_status(&mut self, idx: NodeIndex, status: StatusId) -> bool {
        match self.graph[idx].kind_mut() {
            NodeKind::Subject(subject) if subject.status != status => {
                debug!(
                    subject = subject.id.as_str(),
                    from = subject.status.as_str(),
                    to = status.as_str(),
                    "status changed"
                );
                subject.status = status;
                true
            }
            _ => false,
        }
    }

    /// Emits every node shape, then every arrow
    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        for idx in self.graph.node_indices() {
            self.render_node(idx, renderer);
        }
        for idx in self.graph.node_indices() {
            self.render_links(idx, renderer);
        }
    }

    fn render_node<R: Renderer + ?Sized>(&self, idx: NodeIndex, renderer: &mut R) {
        let node = &self.graph[idx];
        match node.kind() {
            NodeKind::Subject(subject) => {
                let status = self.scales.status(&subject.status);
                let availability = self.scales.availability_at(self.own_availability_rank(idx));
                renderer.draw_circle(Circle {
                    id: subject.id.clone(),
                    label: subject.label().to_string(),
                    tooltip: subject.name.clone(),
                    position: subject.position,
                    fill_color: status.color.clone(),
                    border_color: availability.color.clone(),
                    text_color: status.label_color(node.is_leaf()).to_string(),
                });
            }
            NodeKind::Connector(c) if c.is_pass_through() => {
                renderer.draw_invisible_joint(Joint {
                    id: c.connector.id.clone(),
                    position: c.connector.position,
                });
            }
            NodeKind::Connector(c) => {
                let availability = self.scales.availability_at(self.own_availability_rank(idx));
                renderer.draw_diamond(Diamond {
                    id: c.connector.id.clone(),
                    position: c.connector.position,
                    border_color: availability.color.clone(),
                });
            }
        }
    }

    fn render_links<R: Renderer + ?Sized>(&self, idx: NodeIndex, renderer: &mut R) {
        let to = self.graph[idx].id();
        for (_, dependency) in self.display_dependencies(idx) {
            let from = self.graph[dependency].id();
            let rank = self.link_availability_rank(dependency, idx);
            renderer.draw_arrow(Arrow {
                id: format!("{}-{}", from, to),
                from: from.to_string(),
                to: to.to_string(),
                color: self.scales.availability_at(rank).color.clone(),
            });
        }
    }

    pub(super) fn node_at(&self, idx: NodeIndex) -> &Node {
        &self.graph[idx]
    }

    /// Links into `idx` that survived reduction, in wiring order
    pub(super) fn display_dependencies(&self, idx: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
        let mut links: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| !e.weight().redundant)
            .map(|e| (e.id(), e.source()))
            .collect();
        links.sort_unstable();
        links
    }

    /// Every wired dependency of `idx`, redundant ones included
    pub(super) fn dependencies(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Incoming)
    }
}
