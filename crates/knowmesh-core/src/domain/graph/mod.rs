//! Knowledge graph engine
//!
//! Builds graphs from knowledge queries and analyzes them:
//!
//! - [`GraphBuilder`] turns a [`KnowledgeQuery`](crate::domain::knowledge::KnowledgeQuery)
//!   into a [`GraphModel`] with declared and similarity-derived relationships
//! - [`GraphAnalyzer`] computes statistics, centrality, communities,
//!   cross-project flow and insights
//! - [`KnowledgeGraphService`] wires both to a store and a project registry

pub mod analysis;
pub mod builder;
pub mod model;
pub mod relationship;
pub mod service;
pub mod similarity;

pub use analysis::{
    AnalysisOptions, AnalysisReport, AnalysisView, CentralityReport, CentralityScore, Community,
    CommunityReport, GraphAnalyzer, GraphStatistics, KnowledgeFlowReport, ProjectFlow,
    ProjectRole, TransferPath,
};
pub use builder::{
    BuildOptions, DEPENDENCY_STRENGTH, GraphBuilder, RELATED_STRENGTH, calculate_importance,
};
pub use model::{GraphMetadata, GraphModel, GraphNode, NodeMetadata};
pub use relationship::{
    CREATOR_METADATA, CREATOR_SIMILARITY, Direction, Relationship, RelationshipMetadata,
    RelationshipType,
};
pub use service::KnowledgeGraphService;
pub use similarity::{SimilarityBreakdown, SimilarityScorer};
