//! Knowmesh Core Library
//!
//! This crate provides the knowledge graph engine used to relate reusable
//! knowledge (code patterns, best practices, solutions, architecture notes)
//! harvested from independent codebases:
//! - Graph building from a knowledge store, with explicit and inferred relationships
//! - Multi-factor similarity scoring between knowledge entities
//! - Graph analysis (statistics, centrality, communities, cross-project flow)
//! - Narrative insights over the analysis results
//! - In-memory reference collaborators and JSONL import/export

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::graph::{
        AnalysisOptions, AnalysisReport, BuildOptions, GraphAnalyzer, GraphBuilder, GraphModel,
        KnowledgeGraphService,
    };
    pub use crate::domain::knowledge::{
        KnowledgeEntity, KnowledgeQuery, KnowledgeStore, KnowledgeType,
    };
    pub use crate::domain::project::{ProjectInfo, ProjectRegistry};
    pub use crate::error::{Error, Result};
}
