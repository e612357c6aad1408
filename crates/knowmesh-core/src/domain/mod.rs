//! Domain layer
//!
//! Contains the knowledge model, the collaborator traits and the graph engine.

pub mod graph;
pub mod knowledge;
pub mod project;
