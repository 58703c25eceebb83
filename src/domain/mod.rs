//! Domain models for the curriculum graph
//!
//! Contains the graph engine without any I/O concerns.

mod availability;
mod connector;
mod graph;
mod node;
mod progress;
mod reach;
mod render;
mod scale;
mod subject;

pub use connector::Connector;
pub use graph::CurriculumGraph;
pub use node::{ConnectorNode, Node, NodeKind, NodeRef};
pub use progress::Progress;
pub use render::{Arrow, Circle, Diamond, Joint, Renderer};
pub use scale::{Availability, AvailabilityId, ScaleError, Scales, Status, StatusId};
pub use subject::{DependencyGroup, Position, Prerequisite, Subject};
