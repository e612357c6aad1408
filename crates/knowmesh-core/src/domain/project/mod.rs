//! Project registry domain module
//!
//! The registry knows the languages, frameworks and dependencies of every
//! project knowledge is harvested from. The graph builder uses it to score
//! how related two owning projects are.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metadata about a registered project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Project identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Main implementation language
    pub primary_language: Option<String>,
    /// All languages used by the project
    #[serde(default)]
    pub languages: Vec<String>,
    /// Frameworks used by the project
    #[serde(default)]
    pub frameworks: Vec<String>,
    /// Package dependencies
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl ProjectInfo {
    /// Create a project with no languages or frameworks
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            primary_language: None,
            languages: Vec::new(),
            frameworks: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Set the languages; the first one becomes the primary language
    pub fn with_languages<I, T>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self.primary_language = self.languages.first().cloned();
        self
    }

    /// Set the frameworks
    pub fn with_frameworks<I, T>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.frameworks = frameworks.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the two projects have at least one language in common
    ///
    /// Compared case-insensitively over `languages`.
    pub fn shares_language_with(&self, other: &ProjectInfo) -> bool {
        self.languages.iter().any(|lang| {
            other
                .languages
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(lang))
        })
    }
}

/// Registry of project metadata
#[async_trait]
pub trait ProjectRegistry: Send + Sync {
    /// Look up a project; `None` when it is not registered
    async fn get_project(&self, id: &str) -> Result<Option<ProjectInfo>>;
}
