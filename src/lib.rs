//! Subjects Graph - curriculum prerequisite tracking
//!
//! Models a study plan as a graph of subjects and connectors, tracks the
//! status of each subject, and works out which subjects are unlocked and to
//! what degree. Drawing is delegated to a [`domain::Renderer`].

pub mod cli;
pub mod domain;
pub mod logging;
pub mod scene;
pub mod storage;

pub use domain::{CurriculumGraph, Progress, Renderer, Scales, Subject};
pub use scene::Scene;
