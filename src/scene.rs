//! Recorded drawing of a graph
//!
//! [`Scene`] implements [`Renderer`] by keeping every shape it is handed. It
//! is what the command line serializes for `show --format json`, and what
//! tests inspect instead of a real canvas.

use serde::Serialize;

use crate::domain::{Arrow, Circle, CurriculumGraph, Diamond, Joint, Renderer};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    pub circles: Vec<Circle>,
    pub diamonds: Vec<Diamond>,
    pub joints: Vec<Joint>,
    pub arrows: Vec<Arrow>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `graph` into a fresh scene
    pub fn capture(graph: &CurriculumGraph) -> Self {
        let mut scene = Self::new();
        graph.render(&mut scene);
        scene
    }

    pub fn circle(&self, id: &str) -> Option<&Circle> {
        self.circles.iter().find(|c| c.id == id)
    }

    pub fn diamond(&self, id: &str) -> Option<&Diamond> {
        self.diamonds.iter().find(|d| d.id == id)
    }

    pub fn joint(&self, id: &str) -> Option<&Joint> {
        self.joints.iter().find(|j| j.id == id)
    }

    pub fn arrow(&self, from: &str, to: &str) -> Option<&Arrow> {
        self.arrows.iter().find(|a| a.from == from && a.to == to)
    }

    /// Total number of node shapes drawn
    pub fn shape_count(&self) -> usize {
        self.circles.len() + self.diamonds.len() + self.joints.len()
    }
}

impl Renderer for Scene {
    fn draw_circle(&mut self, circle: Circle) {
        self.circles.push(circle);
    }

    fn draw_diamond(&mut self, diamond: Diamond) {
        self.diamonds.push(diamond);
    }

    fn draw_invisible_joint(&mut self, joint: Joint) {
        self.joints.push(joint);
    }

    fn draw_arrow(&mut self, arrow: Arrow) {
        self.arrows.push(arrow);
    }
}
