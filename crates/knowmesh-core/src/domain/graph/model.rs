//! In-memory graph model
//!
//! A [`GraphModel`] owns one [`GraphNode`] per knowledge entity and the
//! [`Relationship`]s between them. Both collections keep insertion order so
//! that every pass over the graph is reproducible.
//!
//! Invariant: every relationship's source and target reference nodes of the
//! same graph. [`GraphModel::add_relationship`] rejects anything else.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::knowledge::{KnowledgeEntity, KnowledgeQuery};
use crate::error::{Error, Result};

use super::builder::BuildOptions;
use super::relationship::Relationship;

/// A node wrapping exactly one knowledge entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Node id (equal to the entity id)
    pub id: String,
    /// The wrapped entity
    pub entity: KnowledgeEntity,
    /// Derived metadata
    pub metadata: NodeMetadata,
}

impl GraphNode {
    /// Wrap an entity with the given importance
    pub fn new(entity: KnowledgeEntity, importance: f64) -> Self {
        Self {
            id: entity.id.clone(),
            entity,
            metadata: NodeMetadata {
                importance: importance.clamp(0.0, 1.0),
                centrality: None,
                community: None,
            },
        }
    }

    /// Title of the wrapped entity
    pub fn title(&self) -> &str {
        &self.entity.title
    }

    /// Owning project of the wrapped entity
    pub fn project(&self) -> &str {
        &self.entity.source_project
    }
}

/// Metadata derived for a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Importance score (0.0 to 1.0) computed at build time
    pub importance: f64,
    /// Degree centrality written back by analysis
    pub centrality: Option<f64>,
    /// Community label written back by analysis
    pub community: Option<String>,
}

/// Descriptive metadata of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    /// When the graph was built
    pub created_at: DateTime<Utc>,
    /// Last structural change
    pub updated_at: DateTime<Utc>,
    /// Query sent to the knowledge store
    pub query: KnowledgeQuery,
    /// Options used to build the graph
    pub options: BuildOptions,
}

/// A named graph of knowledge nodes and relationships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphModel {
    /// Unique identifier for the graph
    pub id: String,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Nodes keyed by node id
    pub nodes: IndexMap<String, GraphNode>,
    /// Relationships keyed by relationship id
    pub relationships: IndexMap<String, Relationship>,
    /// Build metadata
    pub metadata: GraphMetadata,
}

impl GraphModel {
    /// Create an empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_metadata(name, KnowledgeQuery::default(), BuildOptions::default())
    }

    /// Create an empty graph recording how it is being built
    pub fn with_metadata(
        name: impl Into<String>,
        query: KnowledgeQuery,
        options: BuildOptions,
    ) -> Self {
        let now = Utc::now();
        let description = options.description.clone();

        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description,
            nodes: IndexMap::new(),
            relationships: IndexMap::new(),
            metadata: GraphMetadata {
                created_at: now,
                updated_at: now,
                query,
                options,
            },
        }
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of relationships
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node by id
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Whether a node with this id exists
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Insert a node; returns `false` (and keeps the existing node) on a duplicate id
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }
        self.nodes.insert(node.id.clone(), node);
        self.updated_at_now();
        true
    }

    /// Insert a relationship between two existing nodes
    pub fn add_relationship(&mut self, relationship: Relationship) -> Result<()> {
        for endpoint in [&relationship.source_id, &relationship.target_id] {
            if !self.nodes.contains_key(endpoint) {
                return Err(Error::DanglingRelationship(
                    relationship.id.clone(),
                    endpoint.clone(),
                ));
            }
        }
        self.relationships
            .insert(relationship.id.clone(), relationship);
        self.updated_at_now();
        Ok(())
    }

    /// Whether any relationship joins the two nodes, in either direction
    pub fn has_edge_between(&self, a: &str, b: &str) -> bool {
        self.relationships.values().any(|rel| rel.connects(a, b))
    }

    /// Relationships touching a node
    pub fn relationships_for<'a>(
        &'a self,
        node_id: &'a str,
    ) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships
            .values()
            .filter(move |rel| rel.touches(node_id))
    }

    /// IDs of nodes adjacent to `node_id`, ignoring direction
    pub fn neighbors(&self, node_id: &str) -> Vec<&str> {
        let mut neighbors: Vec<&str> = Vec::new();
        for rel in self.relationships.values() {
            if let Some(other) = rel.other_end(node_id) {
                if other != node_id && !neighbors.contains(&other) {
                    neighbors.push(other);
                }
            }
        }
        neighbors
    }

    /// Relationships at or above `min_strength` whose endpoints both exist
    pub fn filtered_relationships(&self, min_strength: f64) -> Vec<&Relationship> {
        self.relationships
            .values()
            .filter(|rel| rel.strength >= min_strength)
            .filter(|rel| {
                self.nodes.contains_key(&rel.source_id) && self.nodes.contains_key(&rel.target_id)
            })
            .collect()
    }

    fn updated_at_now(&mut self) {
        self.metadata.updated_at = Utc::now();
    }
}
