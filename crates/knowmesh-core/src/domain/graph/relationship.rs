//! Relationships between graph nodes
//!
//! A relationship is a typed, weighted edge. Declared relationships come
//! from entity metadata; inferred ones come from similarity scoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Creator recorded on relationships declared in entity metadata
pub const CREATOR_METADATA: &str = "metadata";
/// Creator recorded on relationships inferred by similarity scoring
pub const CREATOR_SIMILARITY: &str = "similarity";

/// A weighted edge between two nodes of the same graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier for the relationship
    pub id: String,
    /// ID of the source node
    pub source_id: String,
    /// ID of the target node
    pub target_id: String,
    /// Type of relationship
    pub relationship_type: RelationshipType,
    /// Strength of the relationship (0.0 to 1.0)
    pub strength: f64,
    /// Whether the edge reads in one or both directions
    pub direction: Direction,
    /// Provenance
    pub metadata: RelationshipMetadata,
}

impl Relationship {
    /// Create a new relationship with the type's natural direction
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relationship_type: RelationshipType,
    ) -> Self {
        let direction = relationship_type.default_direction();

        Self {
            id: Uuid::new_v4().to_string(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            relationship_type,
            strength: 0.5,
            direction,
            metadata: RelationshipMetadata::default(),
        }
    }

    /// Set the strength (clamped to 0.0-1.0)
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        self
    }

    /// Override the direction
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Record who created the relationship and how confident they were
    pub fn with_provenance(mut self, created_by: impl Into<String>, confidence: f64) -> Self {
        self.metadata.created_by = created_by.into();
        self.metadata.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Check if this relationship is bidirectional
    pub fn is_bidirectional(&self) -> bool {
        self.direction == Direction::Bi
    }

    /// Whether the edge joins `a` and `b`, in either direction
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source_id == a && self.target_id == b) || (self.source_id == b && self.target_id == a)
    }

    /// Whether `node_id` is one of the endpoints
    pub fn touches(&self, node_id: &str) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }

    /// The endpoint opposite to `node_id`
    pub fn other_end(&self, node_id: &str) -> Option<&str> {
        if self.source_id == node_id {
            Some(self.target_id.as_str())
        } else if self.target_id == node_id {
            Some(self.source_id.as_str())
        } else {
            None
        }
    }

    /// Whether the edge starts and ends at the same node
    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }
}

/// Provenance of a relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipMetadata {
    /// When the relationship was created
    pub created_at: DateTime<Utc>,
    /// What created it (`metadata`, `similarity`, or a caller-defined name)
    pub created_by: String,
    /// Confidence in the relationship (0.0 to 1.0)
    pub confidence: f64,
}

impl Default for RelationshipMetadata {
    fn default() -> Self {
        Self {
            created_at: Utc::now(),
            created_by: CREATOR_METADATA.to_string(),
            confidence: 1.0,
        }
    }
}

/// Edge direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Source to target only
    Uni,
    /// Both ways
    Bi,
}

/// Types of relationships between nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipType {
    /// Explicitly declared as related (`relatedMemories`)
    Related,
    /// Source depends on target (`dependencies`)
    DependsOn,
    /// Inferred by similarity scoring
    SimilarTo,
    /// Caller-defined relationship
    Custom(String),
}

impl RelationshipType {
    /// Get the string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Related => "related",
            Self::DependsOn => "depends_on",
            Self::SimilarTo => "similar_to",
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Parse from string, falling back to [`RelationshipType::Custom`]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "related" | "related_to" => Self::Related,
            "depends_on" | "dependson" => Self::DependsOn,
            "similar_to" | "similarto" => Self::SimilarTo,
            _ => Self::Custom(s.to_string()),
        }
    }

    /// Direction a relationship of this type gets unless overridden
    pub fn default_direction(&self) -> Direction {
        match self {
            Self::Related | Self::SimilarTo => Direction::Bi,
            Self::DependsOn | Self::Custom(_) => Direction::Uni,
        }
    }
}

impl From<String> for RelationshipType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<RelationshipType> for String {
    fn from(value: RelationshipType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
