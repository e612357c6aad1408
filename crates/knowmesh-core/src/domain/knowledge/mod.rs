//! Knowledge domain module
//!
//! Knowledge entities are the reusable artifacts (code patterns, best
//! practices, solutions, architecture notes, algorithms) that the graph
//! engine connects. They are owned by a [`KnowledgeStore`]; the graph only
//! ever holds clones.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use knowmesh_core::domain::knowledge::{KnowledgeEntity, KnowledgeQuery, KnowledgeType};
//!
//! let entity = KnowledgeEntity::new("Retry with backoff", KnowledgeType::CodePattern, "proj1")
//!     .with_content("Retry failed requests with exponential backoff")
//!     .with_tags(["retry", "network"]);
//!
//! let query = KnowledgeQuery::new()
//!     .with_type(KnowledgeType::CodePattern)
//!     .with_tags(vec!["retry".into()]);
//! let result = store.query_knowledge(&query).await?;
//! ```

mod entity;
mod query;
mod store;

pub use entity::{DEPENDENCIES_KEY, KnowledgeEntity, KnowledgeType, LANGUAGE_KEY, RELATED_KEY};
pub use query::{KnowledgeQuery, SortDirection, SortKey};
pub use store::{KnowledgeStore, QueryResult};
