//! Graph builder
//!
//! Turns the result of a knowledge store query into a [`GraphModel`]:
//!
//! 1. one node per entity, with an importance score derived from usage;
//! 2. declared relationships read from entity metadata
//!    (`relatedMemories` → `related`, `dependencies` → `depends_on`);
//! 3. inferred `similar_to` relationships between unconnected pairs whose
//!    similarity reaches the configured threshold.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::BuilderConfig;
use crate::domain::knowledge::{KnowledgeEntity, KnowledgeQuery, KnowledgeStore, KnowledgeType};
use crate::domain::project::ProjectRegistry;
use crate::error::Result;

use super::model::{GraphModel, GraphNode};
use super::relationship::{
    CREATOR_METADATA, CREATOR_SIMILARITY, Relationship, RelationshipType,
};
use super::similarity::SimilarityScorer;

/// Strength of relationships declared through `relatedMemories`
pub const RELATED_STRENGTH: f64 = 0.8;
/// Strength of relationships declared through `dependencies`
pub const DEPENDENCY_STRENGTH: f64 = 0.9;

/// Options controlling a graph build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Graph display name
    pub name: String,
    /// Graph description
    pub description: Option<String>,
    /// Add relationships at all (declared and inferred)
    pub include_relationships: bool,
    /// Relationships weaker than this are not kept
    pub min_relationship_strength: f64,
    /// Infer `similar_to` relationships
    pub detect_implicit_relationships: bool,
    /// Minimum similarity for an inferred relationship
    pub similarity_threshold: f64,
    /// Cap on the number of inferred relationships
    pub max_implicit_relationships: usize,
    /// Restrict to projects; only the first entry is applied
    pub project_ids: Vec<String>,
    /// Restrict to knowledge types; only the first entry is applied
    pub knowledge_types: Vec<KnowledgeType>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            name: "Knowledge Graph".to_string(),
            description: None,
            include_relationships: true,
            min_relationship_strength: 0.1,
            detect_implicit_relationships: true,
            similarity_threshold: 0.5,
            max_implicit_relationships: 100,
            project_ids: Vec::new(),
            knowledge_types: Vec::new(),
        }
    }
}

impl BuildOptions {
    /// Set the graph name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the similarity threshold and inferred-edge cap
    pub fn with_implicit(mut self, threshold: f64, max: usize) -> Self {
        self.detect_implicit_relationships = true;
        self.similarity_threshold = threshold;
        self.max_implicit_relationships = max;
        self
    }

    /// Disable relationship inference
    pub fn without_implicit(mut self) -> Self {
        self.detect_implicit_relationships = false;
        self
    }
}

impl From<&BuilderConfig> for BuildOptions {
    fn from(config: &BuilderConfig) -> Self {
        Self {
            include_relationships: config.include_relationships,
            min_relationship_strength: config.min_relationship_strength,
            detect_implicit_relationships: config.detect_implicit_relationships,
            similarity_threshold: config.similarity_threshold,
            max_implicit_relationships: config.max_implicit_relationships,
            ..Self::default()
        }
    }
}

/// Importance of an entity from its usage counters
///
/// `0.5 + 0.3·min(1, access/20) + 0.3·min(1, applications/10)
///  + 0.2·min(1, applied_projects/5)`, capped at 1.0.
pub fn calculate_importance(entity: &KnowledgeEntity) -> f64 {
    let access = (entity.access_count as f64 / 20.0).min(1.0);
    let applications = (entity.application_count as f64 / 10.0).min(1.0);
    let spread = (entity.applied_projects.len() as f64 / 5.0).min(1.0);

    (0.5 + 0.3 * access + 0.3 * applications + 0.2 * spread).min(1.0)
}

/// Builds knowledge graphs from a store and a project registry
pub struct GraphBuilder<S: KnowledgeStore + ?Sized, P: ProjectRegistry + ?Sized> {
    store: Arc<S>,
    registry: Arc<P>,
}

impl<S: KnowledgeStore + ?Sized, P: ProjectRegistry + ?Sized> GraphBuilder<S, P> {
    /// Create a new builder
    pub fn new(store: Arc<S>, registry: Arc<P>) -> Self {
        Self { store, registry }
    }

    /// Build a fresh graph from the entities matching `query`
    ///
    /// A store failure propagates unchanged; no partial graph is returned.
    pub async fn build_graph(
        &self,
        query: KnowledgeQuery,
        options: &BuildOptions,
    ) -> Result<GraphModel> {
        let query = narrow_query(query, options);
        let result = self.store.query_knowledge(&query).await?;

        info!(
            graph_name = %options.name,
            entities = result.entities.len(),
            total = result.total_count,
            "Building knowledge graph"
        );

        let mut graph = GraphModel::with_metadata(options.name.clone(), query, options.clone());
        for entity in result.entities {
            let importance = calculate_importance(&entity);
            let entity_id = entity.id.clone();
            if !graph.add_node(GraphNode::new(entity, importance)) {
                debug!(entity_id = %entity_id, "Skipping duplicate entity");
            }
        }

        let mut connected = HashSet::new();
        let mut explicit = 0;
        let mut implicit = 0;

        if options.include_relationships {
            explicit = add_declared_relationships(&mut graph, options, &mut connected)?;

            if options.detect_implicit_relationships {
                implicit = self
                    .detect_implicit_relationships(&mut graph, options, &mut connected)
                    .await?;
            }
        }

        info!(
            graph_id = %graph.id,
            nodes = graph.node_count(),
            explicit_relationships = explicit,
            implicit_relationships = implicit,
            "Knowledge graph built"
        );

        Ok(graph)
    }

    /// Add `similar_to` edges between unconnected pairs, in node order
    async fn detect_implicit_relationships(
        &self,
        graph: &mut GraphModel,
        options: &BuildOptions,
        connected: &mut HashSet<(String, String)>,
    ) -> Result<usize> {
        let max = options.max_implicit_relationships;
        if max == 0 {
            return Ok(0);
        }

        let mut scorer = SimilarityScorer::new(self.registry.as_ref());
        let ids: Vec<String> = graph.nodes.keys().cloned().collect();
        let mut created = 0;

        'pairs: for (i, source_id) in ids.iter().enumerate() {
            for target_id in &ids[i + 1..] {
                if connected.contains(&pair_key(source_id, target_id)) {
                    continue;
                }

                let similarity = {
                    let a = &graph.nodes[source_id.as_str()].entity;
                    let b = &graph.nodes[target_id.as_str()].entity;
                    scorer.similarity(a, b).await?
                };

                if similarity < options.similarity_threshold
                    || similarity < options.min_relationship_strength
                {
                    continue;
                }

                let relationship =
                    Relationship::new(source_id, target_id, RelationshipType::SimilarTo)
                        .with_strength(similarity)
                        .with_provenance(CREATOR_SIMILARITY, similarity);
                connected.insert(pair_key(source_id, target_id));
                graph.add_relationship(relationship)?;
                created += 1;

                if created >= max {
                    debug!(max, "Implicit relationship cap reached");
                    break 'pairs;
                }
            }
        }

        Ok(created)
    }
}

/// Apply the single-value project/type narrowing
fn narrow_query(mut query: KnowledgeQuery, options: &BuildOptions) -> KnowledgeQuery {
    if let Some(project_id) = options.project_ids.first() {
        if options.project_ids.len() > 1 {
            warn!(
                applied = %project_id,
                ignored = ?&options.project_ids[1..],
                "Only the first project filter is applied"
            );
        }
        query.source_project = Some(project_id.clone());
    }

    if let Some(knowledge_type) = options.knowledge_types.first() {
        if options.knowledge_types.len() > 1 {
            warn!(
                applied = %knowledge_type,
                ignored = ?&options.knowledge_types[1..],
                "Only the first knowledge type filter is applied"
            );
        }
        query.knowledge_type = Some(knowledge_type.clone());
    }

    query
}

/// Add relationships declared in entity metadata; references to unknown
/// nodes and to the node itself are dropped
fn add_declared_relationships(
    graph: &mut GraphModel,
    options: &BuildOptions,
    connected: &mut HashSet<(String, String)>,
) -> Result<usize> {
    let mut declared = Vec::new();

    for node in graph.nodes.values() {
        let targets = node
            .entity
            .related_ids()
            .into_iter()
            .map(|id| (id, RelationshipType::Related, RELATED_STRENGTH))
            .chain(
                node.entity
                    .dependency_ids()
                    .into_iter()
                    .map(|id| (id, RelationshipType::DependsOn, DEPENDENCY_STRENGTH)),
            );

        for (target_id, relationship_type, strength) in targets {
            if target_id == node.id || !graph.contains_node(target_id) {
                continue;
            }
            declared.push(
                Relationship::new(&node.id, target_id, relationship_type)
                    .with_strength(strength)
                    .with_provenance(CREATOR_METADATA, 1.0),
            );
        }
    }

    let mut added = 0;
    for relationship in declared {
        if relationship.strength < options.min_relationship_strength {
            continue;
        }
        connected.insert(pair_key(&relationship.source_id, &relationship.target_id));
        graph.add_relationship(relationship)?;
        added += 1;
    }

    Ok(added)
}

/// Order-independent key for a node pair
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::Direction;
    use crate::domain::knowledge::QueryResult;
    use crate::domain::project::ProjectInfo;
    use crate::error::Error;
    use crate::infrastructure::{InMemoryKnowledgeStore, InMemoryProjectRegistry};
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl KnowledgeStore for FailingStore {
        async fn query_knowledge(&self, _query: &KnowledgeQuery) -> Result<QueryResult> {
            Err(Error::StoreQueryFailed("backend offline".into()))
        }
    }

    fn pattern(id: &str, project: &str) -> KnowledgeEntity {
        KnowledgeEntity::new(id, KnowledgeType::CodePattern, project).with_id(id)
    }

    async fn builder_with(
        entities: Vec<KnowledgeEntity>,
    ) -> GraphBuilder<InMemoryKnowledgeStore, InMemoryProjectRegistry> {
        let store = InMemoryKnowledgeStore::new();
        for entity in entities {
            store.insert(entity).await;
        }
        GraphBuilder::new(Arc::new(store), Arc::new(InMemoryProjectRegistry::new()))
    }

    fn assert_endpoints_resolve(graph: &GraphModel) {
        for rel in graph.relationships.values() {
            assert!(graph.contains_node(&rel.source_id));
            assert!(graph.contains_node(&rel.target_id));
        }
    }

    #[test]
    fn test_importance_formula() {
        let base = pattern("a", "p");
        assert!((calculate_importance(&base) - 0.5).abs() < 1e-12);

        let used = pattern("b", "p").with_usage(10, 5);
        // 0.5 + 0.3 * 0.5 + 0.3 * 0.5
        assert!((calculate_importance(&used) - 0.8).abs() < 1e-12);

        let popular = pattern("c", "p")
            .with_usage(100, 100)
            .with_applied_projects(vec!["x".into(); 9]);
        assert_eq!(calculate_importance(&popular), 1.0);
    }

    #[tokio::test]
    async fn test_empty_store_gives_empty_graph() {
        let builder = builder_with(Vec::new()).await;
        let graph = builder
            .build_graph(KnowledgeQuery::new(), &BuildOptions::default())
            .await
            .unwrap();

        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.relationship_count(), 0);
        assert_eq!(graph.name, "Knowledge Graph");
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let builder = GraphBuilder::new(
            Arc::new(FailingStore),
            Arc::new(InMemoryProjectRegistry::new()),
        );
        let err = builder
            .build_graph(KnowledgeQuery::new(), &BuildOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StoreQueryFailed(_)));
    }

    #[tokio::test]
    async fn test_declared_relationships() {
        let builder = builder_with(vec![
            pattern("a", "p").with_related(["b", "outside", "a"]),
            pattern("b", "p").with_dependencies(["c"]),
            pattern("c", "p"),
        ])
        .await;

        let options = BuildOptions::default().without_implicit();
        let graph = builder.build_graph(KnowledgeQuery::new(), &options).await.unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.relationship_count(), 2);
        assert_endpoints_resolve(&graph);

        let related = graph
            .relationships
            .values()
            .find(|r| r.relationship_type == RelationshipType::Related)
            .unwrap();
        assert_eq!((related.source_id.as_str(), related.target_id.as_str()), ("a", "b"));
        assert_eq!(related.strength, RELATED_STRENGTH);
        assert_eq!(related.direction, Direction::Bi);

        let depends = graph
            .relationships
            .values()
            .find(|r| r.relationship_type == RelationshipType::DependsOn)
            .unwrap();
        assert_eq!((depends.source_id.as_str(), depends.target_id.as_str()), ("b", "c"));
        assert_eq!(depends.strength, DEPENDENCY_STRENGTH);
        assert_eq!(depends.direction, Direction::Uni);
    }

    #[tokio::test]
    async fn test_min_strength_drops_weak_declared_relationships() {
        let builder = builder_with(vec![
            pattern("a", "p").with_related(["b"]).with_dependencies(["c"]),
            pattern("b", "p"),
            pattern("c", "p"),
        ])
        .await;

        let options = BuildOptions {
            min_relationship_strength: 0.85,
            ..BuildOptions::default().without_implicit()
        };
        let graph = builder.build_graph(KnowledgeQuery::new(), &options).await.unwrap();

        assert_eq!(graph.relationship_count(), 1);
        let only = graph.relationships.values().next().unwrap();
        assert_eq!(only.relationship_type, RelationshipType::DependsOn);
    }

    #[tokio::test]
    async fn test_include_relationships_false() {
        let builder = builder_with(vec![
            pattern("a", "p").with_related(["b"]),
            pattern("b", "p"),
        ])
        .await;

        let options = BuildOptions {
            include_relationships: false,
            ..BuildOptions::default()
        };
        let graph = builder.build_graph(KnowledgeQuery::new(), &options).await.unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.relationship_count(), 0);
    }

    #[tokio::test]
    async fn test_implicit_skips_connected_pairs() {
        // Same type and project: similarity is at least (1.0 + 0.8 + 0) / 3 = 0.6
        let builder = builder_with(vec![
            pattern("a", "p").with_related(["b"]),
            pattern("b", "p"),
            pattern("c", "p"),
        ])
        .await;

        let options = BuildOptions::default().with_implicit(0.5, 100);
        let graph = builder.build_graph(KnowledgeQuery::new(), &options).await.unwrap();

        let similar: Vec<_> = graph
            .relationships
            .values()
            .filter(|r| r.relationship_type == RelationshipType::SimilarTo)
            .collect();
        assert_eq!(similar.len(), 2);
        assert!(similar.iter().all(|r| !r.connects("a", "b")));
        assert!(similar.iter().all(|r| r.metadata.created_by == CREATOR_SIMILARITY));

        let ab_edges = graph
            .relationships
            .values()
            .filter(|r| r.connects("a", "b"))
            .count();
        assert_eq!(ab_edges, 1);
        assert_endpoints_resolve(&graph);
    }

    #[tokio::test]
    async fn test_implicit_cap() {
        let entities = (0..6).map(|i| pattern(&format!("n{}", i), "p")).collect();
        let builder = builder_with(entities).await;

        let options = BuildOptions::default().with_implicit(0.5, 4);
        let graph = builder.build_graph(KnowledgeQuery::new(), &options).await.unwrap();
        assert_eq!(graph.relationship_count(), 4);

        // Pairs are visited in a stable double loop: n0 links first
        assert!(graph.relationships.values().all(|r| r.source_id == "n0"));

        let options = BuildOptions::default().with_implicit(0.5, 0);
        let graph = builder.build_graph(KnowledgeQuery::new(), &options).await.unwrap();
        assert_eq!(graph.relationship_count(), 0);
    }

    #[tokio::test]
    async fn test_implicit_threshold() {
        // Different type, different unregistered projects, no tags or content:
        // (0.2 + 0.0 + 0.1) / 3 = 0.1
        let builder = builder_with(vec![
            pattern("a", "p1"),
            KnowledgeEntity::new("b", KnowledgeType::Architecture, "p2").with_id("b"),
        ])
        .await;

        let graph = builder
            .build_graph(KnowledgeQuery::new(), &BuildOptions::default())
            .await
            .unwrap();
        assert_eq!(graph.relationship_count(), 0);

        let options = BuildOptions {
            min_relationship_strength: 0.0,
            ..BuildOptions::default().with_implicit(0.1, 10)
        };
        let graph = builder.build_graph(KnowledgeQuery::new(), &options).await.unwrap();
        assert_eq!(graph.relationship_count(), 1);
        let edge = graph.relationships.values().next().unwrap();
        assert!((edge.strength - 0.1).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_shared_language_projects() {
        let store = InMemoryKnowledgeStore::new();
        store.insert(pattern("a", "p1")).await;
        store.insert(pattern("b", "p2")).await;
        let registry = InMemoryProjectRegistry::new();
        registry
            .register(ProjectInfo::new("p1", "One").with_languages(["rust"]))
            .await;
        registry
            .register(ProjectInfo::new("p2", "Two").with_languages(["rust"]))
            .await;
        let builder = GraphBuilder::new(Arc::new(store), Arc::new(registry));

        // (1.0 + 0.0 + 0.4) / 3
        let options = BuildOptions::default().with_implicit(0.45, 10);
        let graph = builder.build_graph(KnowledgeQuery::new(), &options).await.unwrap();
        assert_eq!(graph.relationship_count(), 1);
        let edge = graph.relationships.values().next().unwrap();
        assert!((edge.strength - 1.4 / 3.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_first_filter_value_only() {
        let builder = builder_with(vec![
            pattern("a", "p1"),
            pattern("b", "p2"),
            KnowledgeEntity::new("c", KnowledgeType::Solution, "p1").with_id("c"),
        ])
        .await;

        let options = BuildOptions {
            project_ids: vec!["p1".into(), "p2".into()],
            knowledge_types: vec![KnowledgeType::CodePattern, KnowledgeType::Solution],
            ..BuildOptions::default()
        };
        let graph = builder.build_graph(KnowledgeQuery::new(), &options).await.unwrap();

        assert_eq!(graph.node_count(), 1);
        assert!(graph.contains_node("a"));
        assert_eq!(graph.metadata.query.source_project.as_deref(), Some("p1"));
        assert_eq!(
            graph.metadata.query.knowledge_type,
            Some(KnowledgeType::CodePattern)
        );
    }
}
