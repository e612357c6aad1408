//! In-memory store and registry
//!
//! Reference implementations of [`KnowledgeStore`] and [`ProjectRegistry`]
//! used by tests and for seeding graphs from JSONL files.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::knowledge::{
    KnowledgeEntity, KnowledgeQuery, KnowledgeStore, QueryResult, SortDirection, SortKey,
};
use crate::domain::project::{ProjectInfo, ProjectRegistry};
use crate::error::Result;

/// Knowledge store backed by an insertion-ordered map
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeStore {
    entities: RwLock<IndexMap<String, KnowledgeEntity>>,
}

impl InMemoryKnowledgeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given entities
    pub fn from_entities(entities: impl IntoIterator<Item = KnowledgeEntity>) -> Self {
        let map = entities
            .into_iter()
            .map(|entity| (entity.id.clone(), entity))
            .collect();
        Self {
            entities: RwLock::new(map),
        }
    }

    /// Insert or replace an entity; replacing keeps its original position
    pub async fn insert(&self, entity: KnowledgeEntity) -> Option<KnowledgeEntity> {
        self.entities.write().await.insert(entity.id.clone(), entity)
    }

    /// Remove an entity by id
    pub async fn remove(&self, id: &str) -> Option<KnowledgeEntity> {
        self.entities.write().await.shift_remove(id)
    }

    /// Get a clone of an entity by id
    pub async fn get(&self, id: &str) -> Option<KnowledgeEntity> {
        self.entities.read().await.get(id).cloned()
    }

    /// Number of stored entities
    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }

    /// Clones of every stored entity in insertion order
    pub async fn all(&self) -> Vec<KnowledgeEntity> {
        self.entities.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn query_knowledge(&self, query: &KnowledgeQuery) -> Result<QueryResult> {
        let entities = self.entities.read().await;

        let mut matches: Vec<&KnowledgeEntity> = entities
            .values()
            .filter(|entity| matches_query(entity, query))
            .collect();

        if let Some(key) = query.sort_by {
            matches.sort_by(|a, b| {
                let ordering = compare_by(a, b, key);
                match query.sort_direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        let total_count = matches.len();
        let page = matches
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect::<Vec<_>>();

        debug!(
            total_count,
            returned = page.len(),
            offset = query.offset,
            "Knowledge query served from memory"
        );

        Ok(QueryResult {
            entities: page,
            total_count,
        })
    }
}

fn matches_query(entity: &KnowledgeEntity, query: &KnowledgeQuery) -> bool {
    if let Some(term) = &query.search {
        if !entity.matches_text(term) {
            return false;
        }
    }

    if let Some(kind) = &query.knowledge_type {
        if &entity.knowledge_type != kind {
            return false;
        }
    }

    let has_all_tags = query.tags.iter().all(|wanted| {
        entity
            .tags
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(wanted))
    });
    if !has_all_tags {
        return false;
    }

    if let Some(project) = &query.source_project {
        if &entity.source_project != project {
            return false;
        }
    }

    if let Some(project) = &query.applied_to_project {
        if !entity.applied_projects.contains(project) {
            return false;
        }
    }

    if let Some(language) = &query.language {
        match entity.language() {
            Some(actual) if actual.eq_ignore_ascii_case(language) => {}
            _ => return false,
        }
    }

    if query.created_after.is_some_and(|after| entity.created_at < after) {
        return false;
    }
    if query
        .created_before
        .is_some_and(|before| entity.created_at > before)
    {
        return false;
    }

    true
}

fn compare_by(a: &KnowledgeEntity, b: &KnowledgeEntity, key: SortKey) -> Ordering {
    match key {
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortKey::AccessCount => a.access_count.cmp(&b.access_count),
        SortKey::ApplicationCount => a.application_count.cmp(&b.application_count),
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    }
}

/// Project registry backed by a map
#[derive(Debug, Default)]
pub struct InMemoryProjectRegistry {
    projects: RwLock<HashMap<String, ProjectInfo>>,
}

impl InMemoryProjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a project
    pub async fn register(&self, project: ProjectInfo) {
        self.projects
            .write()
            .await
            .insert(project.id.clone(), project);
    }

    /// Number of registered projects
    pub async fn len(&self) -> usize {
        self.projects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.projects.read().await.is_empty()
    }
}

#[async_trait]
impl ProjectRegistry for InMemoryProjectRegistry {
    async fn get_project(&self, id: &str) -> Result<Option<ProjectInfo>> {
        Ok(self.projects.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge::KnowledgeType;
    use chrono::{Duration, Utc};

    async fn seeded_store() -> InMemoryKnowledgeStore {
        let now = Utc::now();
        let store = InMemoryKnowledgeStore::new();
        store
            .insert(
                KnowledgeEntity::new("Retry loop", KnowledgeType::CodePattern, "p1")
                    .with_id("a")
                    .with_tags(["Network", "retry"])
                    .with_language("Rust")
                    .with_usage(5, 1)
                    .with_created_at(now - Duration::days(3)),
            )
            .await;
        store
            .insert(
                KnowledgeEntity::new("Layered design", KnowledgeType::Architecture, "p2")
                    .with_id("b")
                    .with_content("Keep the network layer separate")
                    .with_tags(["network"])
                    .with_usage(1, 4)
                    .with_applied_projects(vec!["p1".into()])
                    .with_created_at(now - Duration::days(1)),
            )
            .await;
        store
            .insert(
                KnowledgeEntity::new("Binary search", KnowledgeType::Algorithm, "p1")
                    .with_id("c")
                    .with_language("python")
                    .with_usage(9, 0)
                    .with_created_at(now),
            )
            .await;
        store
    }

    fn ids(result: &QueryResult) -> Vec<&str> {
        result.entities.iter().map(|e| e.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_empty_query_returns_everything_in_order() {
        let store = seeded_store().await;
        let result = store.query_knowledge(&KnowledgeQuery::new()).await.unwrap();

        assert_eq!(ids(&result), vec!["a", "b", "c"]);
        assert_eq!(result.total_count, 3);
    }

    #[tokio::test]
    async fn test_filters() {
        let store = seeded_store().await;

        let search = KnowledgeQuery::new().with_search("NETWORK");
        assert_eq!(ids(&store.query_knowledge(&search).await.unwrap()), vec!["a", "b"]);

        let tags = KnowledgeQuery::new().with_tags(vec!["network".into(), "retry".into()]);
        assert_eq!(ids(&store.query_knowledge(&tags).await.unwrap()), vec!["a"]);

        let kind = KnowledgeQuery::new().with_type(KnowledgeType::Algorithm);
        assert_eq!(ids(&store.query_knowledge(&kind).await.unwrap()), vec!["c"]);

        let language = KnowledgeQuery::new().with_language("PYTHON");
        assert_eq!(ids(&store.query_knowledge(&language).await.unwrap()), vec!["c"]);

        let applied = KnowledgeQuery::new().with_applied_to("p1");
        assert_eq!(ids(&store.query_knowledge(&applied).await.unwrap()), vec!["b"]);

        let project = KnowledgeQuery::new().with_source_project("p1");
        assert_eq!(ids(&store.query_knowledge(&project).await.unwrap()), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_date_range_is_inclusive() {
        let store = seeded_store().await;
        let b = store.get("b").await.unwrap();

        let query =
            KnowledgeQuery::new().with_created_between(Some(b.created_at), Some(b.created_at));
        assert_eq!(ids(&store.query_knowledge(&query).await.unwrap()), vec!["b"]);
    }

    #[tokio::test]
    async fn test_sort_and_pagination() {
        let store = seeded_store().await;

        let query = KnowledgeQuery::new()
            .with_sort(SortKey::AccessCount, SortDirection::Descending)
            .with_page(1, 1);
        let result = store.query_knowledge(&query).await.unwrap();
        assert_eq!(ids(&result), vec!["a"]);
        assert_eq!(result.total_count, 3);

        let query = KnowledgeQuery::new().with_sort(SortKey::Title, SortDirection::Ascending);
        let result = store.query_knowledge(&query).await.unwrap();
        assert_eq!(ids(&result), vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_insert_replace_and_remove() {
        let store = seeded_store().await;
        let replaced = store
            .insert(KnowledgeEntity::new("Retry v2", KnowledgeType::CodePattern, "p1").with_id("a"))
            .await;
        assert!(replaced.is_some());
        assert_eq!(store.len().await, 3);
        assert_eq!(store.all().await[0].title, "Retry v2");

        assert!(store.remove("a").await.is_some());
        assert!(store.get("a").await.is_none());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_registry_lookup() {
        let registry = InMemoryProjectRegistry::new();
        assert!(registry.is_empty().await);
        registry
            .register(ProjectInfo::new("p1", "Project One").with_languages(["rust"]))
            .await;

        let found = registry.get_project("p1").await.unwrap().unwrap();
        assert_eq!(found.primary_language.as_deref(), Some("rust"));
        assert!(registry.get_project("p9").await.unwrap().is_none());
    }
}
