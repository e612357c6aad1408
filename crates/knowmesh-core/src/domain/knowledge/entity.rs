//! Knowledge entity types
//!
//! A knowledge entity is a reusable artifact harvested from a project: a
//! code pattern, an architecture note, a best practice, a solution or an
//! algorithm. Entities are consumed read-only by the graph engine.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Metadata key holding ids of explicitly related entities
pub const RELATED_KEY: &str = "relatedMemories";
/// Metadata key holding ids of entities this one depends on
pub const DEPENDENCIES_KEY: &str = "dependencies";
/// Metadata key holding the implementation language of the entity
pub const LANGUAGE_KEY: &str = "language";

/// A reusable piece of knowledge owned by a single project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntity {
    /// Unique identifier for the entity
    pub id: String,
    /// Kind of knowledge
    pub knowledge_type: KnowledgeType,
    /// Short human-readable title
    pub title: String,
    /// Free-text body (code, prose, or both)
    pub content: String,
    /// ID of the project the entity was harvested from
    pub source_project: String,
    /// Tag set
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// When the entity was created
    pub created_at: DateTime<Utc>,
    /// When the entity was last updated
    pub updated_at: DateTime<Utc>,
    /// How many times the entity was read
    #[serde(default)]
    pub access_count: u32,
    /// How many times the entity was applied somewhere
    #[serde(default)]
    pub application_count: u32,
    /// Projects the entity has been applied to
    #[serde(default)]
    pub applied_projects: Vec<String>,
    /// Free-form metadata (`relatedMemories`, `dependencies`, `language`, ...)
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl KnowledgeEntity {
    /// Create a new knowledge entity
    pub fn new(
        title: impl Into<String>,
        knowledge_type: KnowledgeType,
        source_project: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            knowledge_type,
            title: title.into(),
            content: String::new(),
            source_project: source_project.into(),
            tags: BTreeSet::new(),
            created_at: now,
            updated_at: now,
            access_count: 0,
            application_count: 0,
            applied_projects: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// Override the generated id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the content body
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Set the tags
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Declare explicitly related entities
    pub fn with_related<I, T>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.with_id_list(RELATED_KEY, ids)
    }

    /// Declare entities this one depends on
    pub fn with_dependencies<I, T>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.with_id_list(DEPENDENCIES_KEY, ids)
    }

    /// Set the implementation language
    pub fn with_language(self, language: impl Into<String>) -> Self {
        self.with_metadata(LANGUAGE_KEY, Value::String(language.into()))
    }

    /// Set an arbitrary metadata value
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Set usage counters
    pub fn with_usage(mut self, access_count: u32, application_count: u32) -> Self {
        self.access_count = access_count;
        self.application_count = application_count;
        self
    }

    /// Set the projects the entity has been applied to
    pub fn with_applied_projects(mut self, projects: Vec<String>) -> Self {
        self.applied_projects = projects;
        self
    }

    /// Set the creation timestamp
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }

    fn with_id_list<I, T>(self, key: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let values = ids.into_iter().map(|id| Value::String(id.into())).collect();
        self.with_metadata(key, Value::Array(values))
    }

    /// Record a read of the entity
    pub fn record_access(&mut self) {
        self.access_count = self.access_count.saturating_add(1);
        self.updated_at = Utc::now();
    }

    /// Record that the entity was applied to a project
    pub fn record_application(&mut self, project_id: impl Into<String>) {
        let project_id = project_id.into();
        self.application_count = self.application_count.saturating_add(1);
        if !self.applied_projects.contains(&project_id) {
            self.applied_projects.push(project_id);
        }
        self.updated_at = Utc::now();
    }

    /// IDs listed under `relatedMemories`
    pub fn related_ids(&self) -> Vec<&str> {
        self.id_list(RELATED_KEY)
    }

    /// IDs listed under `dependencies`
    pub fn dependency_ids(&self) -> Vec<&str> {
        self.id_list(DEPENDENCIES_KEY)
    }

    /// Implementation language, if recorded
    pub fn language(&self) -> Option<&str> {
        self.metadata.get(LANGUAGE_KEY).and_then(Value::as_str)
    }

    /// Non-string elements are skipped.
    fn id_list(&self, key: &str) -> Vec<&str> {
        match self.metadata.get(key) {
            Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Case-insensitive match against title, content and tags
    pub fn matches_text(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self.content.to_lowercase().contains(&term)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&term))
    }
}

/// Kinds of knowledge
///
/// Serialized as a plain kebab-case string; unknown strings round-trip
/// through [`KnowledgeType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KnowledgeType {
    /// Reusable code pattern (e.g. "retry with backoff")
    CodePattern,
    /// Architecture note or decision
    Architecture,
    /// Best practice or convention
    BestPractice,
    /// Solution to a concrete problem
    Solution,
    /// Algorithm description or implementation
    Algorithm,
    /// Any other kind
    Other(String),
}

impl KnowledgeType {
    /// Get the string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::CodePattern => "code-pattern",
            Self::Architecture => "architecture",
            Self::BestPractice => "best-practice",
            Self::Solution => "solution",
            Self::Algorithm => "algorithm",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Parse from string, falling back to [`KnowledgeType::Other`]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().replace('_', "-").as_str() {
            "code-pattern" | "pattern" => Self::CodePattern,
            "architecture" => Self::Architecture,
            "best-practice" | "practice" => Self::BestPractice,
            "solution" => Self::Solution,
            "algorithm" | "algo" => Self::Algorithm,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Get all built-in knowledge types
    pub fn all() -> &'static [KnowledgeType] {
        &[
            Self::CodePattern,
            Self::Architecture,
            Self::BestPractice,
            Self::Solution,
            Self::Algorithm,
        ]
    }
}

impl From<String> for KnowledgeType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<KnowledgeType> for String {
    fn from(value: KnowledgeType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for KnowledgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
