//! Drawing contract between the graph and whatever displays it
//!
//! The graph never draws anything itself. It emits shapes through a
//! [`Renderer`]: every node shape first, then every arrow, so arrows can
//! refer to shapes by id.

use serde::{Deserialize, Serialize};

use super::subject::Position;

/// A subject node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    pub id: String,
    pub label: String,
    pub tooltip: String,
    pub position: Position,
    pub fill_color: String,
    pub border_color: String,
    pub text_color: String,
}

/// A connector that aggregates or fans out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diamond {
    pub id: String,
    pub position: Position,
    pub border_color: String,
}

/// A one-in one-out connector, used only to bend an arrow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub id: String,
    pub position: Position,
}

/// A dependency arrow, drawn from the dependency to its consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub id: String,
    pub from: String,
    pub to: String,
    pub color: String,
}

pub trait Renderer {
    fn draw_circle(&mut self, circle: Circle);

    fn draw_diamond(&mut self, diamond: Diamond);

    fn draw_invisible_joint(&mut self, joint: Joint);

    fn draw_arrow(&mut self, arrow: Arrow);
}
