//! Knowledge store query filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::KnowledgeType;

/// Filter passed to [`super::KnowledgeStore::query_knowledge`]
///
/// Every set field narrows the result; tags use AND semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeQuery {
    /// Free-text search over title, content and tags
    pub search: Option<String>,
    /// Restrict to a knowledge type
    pub knowledge_type: Option<KnowledgeType>,
    /// Every listed tag must be present
    pub tags: Vec<String>,
    /// Restrict to entities owned by this project
    pub source_project: Option<String>,
    /// Restrict to entities applied to this project
    pub applied_to_project: Option<String>,
    /// Restrict to entities written in this language
    pub language: Option<String>,
    /// Inclusive lower bound on creation time
    pub created_after: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time
    pub created_before: Option<DateTime<Utc>>,
    /// Sort key (store order when unset)
    pub sort_by: Option<SortKey>,
    /// Sort direction
    pub sort_direction: SortDirection,
    /// Number of matches to skip
    pub offset: usize,
    /// Maximum number of matches to return
    pub limit: Option<usize>,
}

impl KnowledgeQuery {
    /// Create an unrestricted query
    pub fn new() -> Self {
        Self::default()
    }

    /// Search title, content and tags
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Restrict to a knowledge type
    pub fn with_type(mut self, knowledge_type: KnowledgeType) -> Self {
        self.knowledge_type = Some(knowledge_type);
        self
    }

    /// Require all of these tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Restrict to a source project
    pub fn with_source_project(mut self, project_id: impl Into<String>) -> Self {
        self.source_project = Some(project_id.into());
        self
    }

    /// Restrict to entities applied to a project
    pub fn with_applied_to(mut self, project_id: impl Into<String>) -> Self {
        self.applied_to_project = Some(project_id.into());
        self
    }

    /// Restrict to a language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Restrict the creation date range (inclusive)
    pub fn with_created_between(
        mut self,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_after = after;
        self.created_before = before;
        self
    }

    /// Sort the results
    pub fn with_sort(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort_by = Some(key);
        self.sort_direction = direction;
        self
    }

    /// Paginate the results
    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }
}

/// Sort keys supported by stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    CreatedAt,
    UpdatedAt,
    AccessCount,
    ApplicationCount,
    Title,
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}
