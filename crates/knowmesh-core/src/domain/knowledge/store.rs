//! Knowledge store trait
//!
//! The store owns knowledge entities and answers filtered queries. The
//! trait abstracts over storage backends; the graph builder only consumes
//! [`KnowledgeStore::query_knowledge`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::entity::KnowledgeEntity;
use super::query::KnowledgeQuery;

/// Store of knowledge entities
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Return entities matching the query
    ///
    /// `total_count` is the number of matches before offset/limit.
    async fn query_knowledge(&self, query: &KnowledgeQuery) -> Result<QueryResult>;
}

/// Result of a knowledge query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    /// Matching entities (after pagination)
    pub entities: Vec<KnowledgeEntity>,
    /// Number of matches before pagination
    pub total_count: usize,
}

impl QueryResult {
    /// Wrap an unpaginated list of entities
    pub fn from_entities(entities: Vec<KnowledgeEntity>) -> Self {
        let total_count = entities.len();
        Self {
            entities,
            total_count,
        }
    }
}
