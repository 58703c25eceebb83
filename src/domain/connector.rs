//! Connector domain model
//!
//! A connector is a many-to-many junction: it aggregates several sources and
//! feeds several targets. It has no status of its own.

use serde::{Deserialize, Serialize};

use super::subject::Position;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub id: String,

    #[serde(default)]
    pub position: Position,

    /// Subjects or connectors feeding this connector
    #[serde(alias = "dependencies", default)]
    pub dependency_ids: Vec<String>,

    /// Subjects or connectors this connector feeds
    #[serde(alias = "targets", default)]
    pub target_ids: Vec<String>,
}

impl Connector {
    pub fn new<D, T>(id: impl Into<String>, dependency_ids: D, target_ids: T) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            id: id.into(),
            position: Position::default(),
            dependency_ids: dependency_ids.into_iter().map(Into::into).collect(),
            target_ids: target_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}
