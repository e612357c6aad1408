//! Infrastructure layer
//!
//! Reference collaborators for the graph engine:
//! - In-memory knowledge store and project registry
//! - JSONL import/export of knowledge entities

pub mod jsonl;
pub mod memory;

pub use jsonl::{
    export_entities_jsonl, import_entities_jsonl, read_entities_jsonl, write_entities_jsonl,
};
pub use memory::{InMemoryKnowledgeStore, InMemoryProjectRegistry};
