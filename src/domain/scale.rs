//! Status and availability scales
//!
//! Both scales are ordered lists. Only the position of an entry matters for
//! comparisons: the rank of a status or availability is its index in the scale.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("Status scale must contain at least one status")]
    NoStatuses,

    #[error("Availability scale must contain at least one availability")]
    NoAvailabilities,
}

/// Identifier of an entry in the status scale
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(String);

impl StatusId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StatusId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StatusId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of an entry in the availability scale
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityId(String);

impl AvailabilityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AvailabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AvailabilityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AvailabilityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Where a subject stands (not started, pending final exam, approved, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub id: StatusId,

    /// Display name, shown in legends
    #[serde(alias = "displayName", default)]
    pub name: String,

    /// Fill color of subjects in this status
    pub color: String,

    /// Label color of subjects in this status
    #[serde(default = "default_text_color")]
    pub text_color: String,

    /// Label color used instead of `text_color` when the subject is a leaf
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_text_color: Option<String>,
}

fn default_text_color() -> String {
    "#FFFFFF".to_string()
}

impl Status {
    pub fn new(id: impl Into<StatusId>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            text_color: default_text_color(),
            leaf_text_color: None,
        }
    }

    /// Returns the label color for a subject in this status
    pub fn label_color(&self, is_leaf: bool) -> &str {
        match (&self.leaf_text_color, is_leaf) {
            (Some(leaf), true) => leaf,
            _ => &self.text_color,
        }
    }
}

/// How unlocked a subject or connector currently is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub id: AvailabilityId,

    #[serde(alias = "displayName", default)]
    pub name: String,

    /// Border color of nodes and color of arrows at this tier
    pub color: String,
}

impl Availability {
    pub fn new(
        id: impl Into<AvailabilityId>,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// The two ordered scales every graph is evaluated against
///
/// Both scales are guaranteed non-empty, so lookups that miss can always
/// fall back to the lowest-ranked entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Scales {
    statuses: Vec<Status>,
    availabilities: Vec<Availability>,
}

impl Scales {
    pub fn new(statuses: Vec<Status>, availabilities: Vec<Availability>) -> Result<Self, ScaleError> {
        if statuses.is_empty() {
            return Err(ScaleError::NoStatuses);
        }
        if availabilities.is_empty() {
            return Err(ScaleError::NoAvailabilities);
        }
        Ok(Self {
            statuses,
            availabilities,
        })
    }

    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }

    pub fn availabilities(&self) -> &[Availability] {
        &self.availabilities
    }

    /// Rank of a status id, if it belongs to the scale
    pub fn find_status_rank(&self, id: &StatusId) -> Option<usize> {
        self.statuses.iter().position(|s| &s.id == id)
    }

    /// Rank of a status id; unknown ids rank as the first status
    pub fn status_rank(&self, id: &StatusId) -> usize {
        self.find_status_rank(id).unwrap_or(0)
    }

    /// Resolves a status id, falling back to the first status
    pub fn status(&self, id: &StatusId) -> &Status {
        &self.statuses[self.status_rank(id)]
    }

    pub fn status_at(&self, rank: usize) -> &Status {
        &self.statuses[rank.min(self.statuses.len() - 1)]
    }

    /// The status every subject starts in
    pub fn default_status(&self) -> &Status {
        &self.statuses[0]
    }

    /// The status after `id`, wrapping around to the first one
    pub fn next_status(&self, id: &StatusId) -> &Status {
        let next = (self.status_rank(id) + 1) % self.statuses.len();
        &self.statuses[next]
    }

    pub fn top_status_rank(&self) -> usize {
        self.statuses.len() - 1
    }

    /// Rank of an availability id, if it belongs to the scale
    pub fn find_availability_rank(&self, id: &AvailabilityId) -> Option<usize> {
        self.availabilities.iter().position(|a| &a.id == id)
    }

    /// Rank of an availability id; unknown ids rank as the first tier
    pub fn availability_rank(&self, id: &AvailabilityId) -> usize {
        self.find_availability_rank(id).unwrap_or(0)
    }

    pub fn availability_at(&self, rank: usize) -> &Availability {
        &self.availabilities[rank.min(self.availabilities.len() - 1)]
    }

    pub fn top_availability_rank(&self) -> usize {
        self.availabilities.len() - 1
    }
}
