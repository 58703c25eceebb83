//! Subject domain model
//!
//! A subject is a course of the curriculum. It carries its current status and
//! a list of prerequisite tiers, one per availability level it can unlock.

use serde::{Deserialize, Serialize};

use super::scale::{AvailabilityId, StatusId};

/// Canvas coordinates of a node, owned by the caller
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// "Each of these subjects must be at least at `required_status`"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGroup {
    #[serde(alias = "statusId")]
    pub required_status: StatusId,

    #[serde(alias = "subjects", default)]
    pub subject_ids: Vec<String>,
}

impl DependencyGroup {
    pub fn new<I, S>(required_status: impl Into<StatusId>, subject_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_status: required_status.into(),
            subject_ids: subject_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// The groups that must all hold for a subject to reach `availability_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prerequisite {
    pub availability_id: AvailabilityId,

    #[serde(alias = "dependencies", default)]
    pub dependency_groups: Vec<DependencyGroup>,
}

impl Prerequisite {
    pub fn new(availability_id: impl Into<AvailabilityId>, groups: Vec<DependencyGroup>) -> Self {
        Self {
            availability_id: availability_id.into(),
            dependency_groups: groups,
        }
    }
}

/// A course in the curriculum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,

    /// Full name, shown as tooltip
    #[serde(default)]
    pub name: String,

    /// Short label drawn inside the node
    #[serde(default)]
    pub short_name: String,

    #[serde(default)]
    pub position: Position,

    /// Current status; empty or unknown ids resolve to the first status
    #[serde(default)]
    pub status: StatusId,

    #[serde(default)]
    pub prerequisites: Vec<Prerequisite>,
}

impl Subject {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            short_name: String::new(),
            position: Position::default(),
            status: StatusId::default(),
            prerequisites: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: impl Into<StatusId>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = short_name.into();
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_prerequisite(mut self, prerequisite: Prerequisite) -> Self {
        self.prerequisites.push(prerequisite);
        self
    }

    /// Label drawn inside the node, falling back to the id
    pub fn label(&self) -> &str {
        if self.short_name.is_empty() {
            &self.id
        } else {
            &self.short_name
        }
    }

    /// Every subject id mentioned by any tier, in declaration order
    pub fn required_subject_ids(&self) -> impl Iterator<Item = &str> {
        self.prerequisites
            .iter()
            .flat_map(|p| &p.dependency_groups)
            .flat_map(|g| &g.subject_ids)
            .map(String::as_str)
    }
}
