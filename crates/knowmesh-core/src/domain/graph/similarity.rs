//! Multi-factor similarity between knowledge entities
//!
//! The score is the mean of the factors that could be evaluated:
//!
//! | factor  | value                                                        |
//! |---------|--------------------------------------------------------------|
//! | type    | 1.0 when equal, 0.2 otherwise                                |
//! | tags    | `|A ∩ B| / max(|A|, |B|)`, only when both sides have tags    |
//! | content | Jaccard over normalized words longer than 3 characters       |
//! | project | 0.8 same project, 0.4 shared language, 0.1 otherwise         |
//!
//! Tag overlap is measured against the larger tag set, not the union.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::knowledge::KnowledgeEntity;
use crate::domain::project::{ProjectInfo, ProjectRegistry};
use crate::error::{Error, Result};

pub const TYPE_MATCH_SCORE: f64 = 1.0;
pub const TYPE_MISMATCH_SCORE: f64 = 0.2;
pub const SAME_PROJECT_SCORE: f64 = 0.8;
pub const SHARED_LANGUAGE_SCORE: f64 = 0.4;
pub const UNRELATED_PROJECT_SCORE: f64 = 0.1;

/// Words must be strictly longer than this to count
const MIN_WORD_LEN: usize = 3;

/// Per-factor similarity values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityBreakdown {
    /// Knowledge type factor
    pub type_score: f64,
    /// Tag overlap factor (absent when either side has no tags)
    pub tag_score: Option<f64>,
    /// Content word-set Jaccard factor
    pub content_score: f64,
    /// Project relatedness factor
    pub project_score: f64,
}

impl SimilarityBreakdown {
    /// Number of factors that were evaluated
    pub fn factor_count(&self) -> usize {
        if self.tag_score.is_some() { 4 } else { 3 }
    }

    /// Mean of the evaluated factors
    pub fn score(&self) -> f64 {
        let sum = self.type_score
            + self.tag_score.unwrap_or(0.0)
            + self.content_score
            + self.project_score;
        sum / self.factor_count() as f64
    }
}

/// Score two entities given their (optional) project records
///
/// Project records are only consulted when the source projects differ.
pub fn score_entities(
    a: &KnowledgeEntity,
    b: &KnowledgeEntity,
    a_project: Option<&ProjectInfo>,
    b_project: Option<&ProjectInfo>,
) -> SimilarityBreakdown {
    SimilarityBreakdown {
        type_score: type_score(a, b),
        tag_score: tag_overlap(&a.tags, &b.tags),
        content_score: content_similarity(&a.content, &b.content),
        project_score: project_score(&a.source_project, &b.source_project, a_project, b_project),
    }
}

/// Knowledge type factor
pub fn type_score(a: &KnowledgeEntity, b: &KnowledgeEntity) -> f64 {
    if a.knowledge_type == b.knowledge_type {
        TYPE_MATCH_SCORE
    } else {
        TYPE_MISMATCH_SCORE
    }
}

/// Tag overlap relative to the larger tag set; `None` if either set is empty
pub fn tag_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let shared = a.intersection(b).count();
    Some(shared as f64 / a.len().max(b.len()) as f64)
}

/// Jaccard similarity of the two texts' normalized word sets
pub fn content_similarity(a: &str, b: &str) -> f64 {
    let words_a = tokenize(a);
    let words_b = tokenize(b);

    let union = words_a.union(&words_b).count();
    if union == 0 {
        return 0.0;
    }
    let shared = words_a.intersection(&words_b).count();
    shared as f64 / union as f64
}

/// Lowercase, strip punctuation, split on whitespace, keep words longer than 3 chars
pub fn tokenize(text: &str) -> HashSet<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_WORD_LEN)
        .map(str::to_string)
        .collect()
}

/// Project relatedness factor
pub fn project_score(
    a_project_id: &str,
    b_project_id: &str,
    a_project: Option<&ProjectInfo>,
    b_project: Option<&ProjectInfo>,
) -> f64 {
    if a_project_id == b_project_id {
        return SAME_PROJECT_SCORE;
    }
    match (a_project, b_project) {
        (Some(a), Some(b)) if a.shares_language_with(b) => SHARED_LANGUAGE_SCORE,
        _ => UNRELATED_PROJECT_SCORE,
    }
}

/// Similarity scorer with a per-instance project lookup cache
///
/// One scorer lives for one graph build; registry lookups happen at most
/// once per project id.
pub struct SimilarityScorer<'a, P: ProjectRegistry + ?Sized> {
    registry: &'a P,
    projects: HashMap<String, Option<ProjectInfo>>,
}

impl<'a, P: ProjectRegistry + ?Sized> SimilarityScorer<'a, P> {
    /// Create a scorer backed by a project registry
    pub fn new(registry: &'a P) -> Self {
        Self {
            registry,
            projects: HashMap::new(),
        }
    }

    /// Score two entities, resolving their projects when needed
    pub async fn breakdown(
        &mut self,
        a: &KnowledgeEntity,
        b: &KnowledgeEntity,
    ) -> Result<SimilarityBreakdown> {
        if a.source_project == b.source_project {
            return Ok(score_entities(a, b, None, None));
        }

        self.resolve(&a.source_project).await?;
        self.resolve(&b.source_project).await?;

        let a_project = self.projects.get(&a.source_project).and_then(Option::as_ref);
        let b_project = self.projects.get(&b.source_project).and_then(Option::as_ref);
        Ok(score_entities(a, b, a_project, b_project))
    }

    /// Combined similarity score
    pub async fn similarity(&mut self, a: &KnowledgeEntity, b: &KnowledgeEntity) -> Result<f64> {
        Ok(self.breakdown(a, b).await?.score())
    }

    /// Number of distinct projects looked up so far
    pub fn cached_projects(&self) -> usize {
        self.projects.len()
    }

    async fn resolve(&mut self, project_id: &str) -> Result<()> {
        if !self.projects.contains_key(project_id) {
            let info = self
                .registry
                .get_project(project_id)
                .await
                .map_err(|e| match e {
                    Error::RegistryLookupFailed(..) => e,
                    other => Error::RegistryLookupFailed(project_id.to_string(), other.to_string()),
                })?;
            self.projects.insert(project_id.to_string(), info);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge::KnowledgeType;
    use crate::infrastructure::InMemoryProjectRegistry;
    use async_trait::async_trait;

    struct OfflineRegistry;

    #[async_trait]
    impl ProjectRegistry for OfflineRegistry {
        async fn get_project(&self, _id: &str) -> Result<Option<ProjectInfo>> {
            Err(Error::Other("registry offline".into()))
        }
    }

    fn entity(kind: KnowledgeType, project: &str, tags: &[&str], content: &str) -> KnowledgeEntity {
        KnowledgeEntity::new("e", kind, project)
            .with_tags(tags.iter().copied())
            .with_content(content)
    }

    #[test]
    fn test_tokenize() {
        let words = tokenize("Hello, World! The cache-aside pattern; use it.");
        assert!(words.contains("hello"));
        assert!(words.contains("world"));
        assert!(words.contains("cacheaside"));
        assert!(words.contains("pattern"));
        assert!(!words.contains("the"));
        assert!(!words.contains("use"));
        assert_eq!(words.len(), 4);
    }

    #[test]
    fn test_tokenize_keeps_underscores() {
        let words = tokenize("call retry_with_backoff now");
        assert!(words.contains("retry_with_backoff"));
        assert!(words.contains("call"));
        assert!(!words.contains("now"));
    }

    #[test]
    fn test_content_similarity() {
        assert_eq!(content_similarity("", ""), 0.0);
        assert_eq!(content_similarity("alpha beta", "gamma"), 0.0);
        assert_eq!(content_similarity("alpha gamma", "ALPHA, gamma!"), 1.0);
        // {alpha, gamma, delta} vs {alpha, omega}: 1 shared out of 4
        assert!((content_similarity("alpha gamma delta", "alpha omega") - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_tag_overlap_uses_larger_set() {
        let a: BTreeSet<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
        let b: BTreeSet<String> = ["x"].iter().map(|s| s.to_string()).collect();

        assert_eq!(tag_overlap(&a, &b), Some(1.0 / 3.0));

        let c: BTreeSet<String> = ["x", "q"].iter().map(|s| s.to_string()).collect();
        // union would be 4, larger set is 3
        assert_eq!(tag_overlap(&a, &c), Some(1.0 / 3.0));
        assert_eq!(tag_overlap(&a, &BTreeSet::new()), None);
    }

    #[test]
    fn test_project_score() {
        let rust = ProjectInfo::new("a", "A").with_languages(["rust"]);
        let rust_too = ProjectInfo::new("b", "B").with_languages(["rust", "ts"]);
        let go = ProjectInfo::new("c", "C").with_languages(["go"]);

        assert_eq!(project_score("p", "p", None, None), SAME_PROJECT_SCORE);
        assert_eq!(
            project_score("a", "b", Some(&rust), Some(&rust_too)),
            SHARED_LANGUAGE_SCORE
        );
        assert_eq!(project_score("a", "c", Some(&rust), Some(&go)), UNRELATED_PROJECT_SCORE);
        assert_eq!(project_score("a", "x", Some(&rust), None), UNRELATED_PROJECT_SCORE);
    }

    #[test]
    fn test_scenario_arithmetic() {
        let a = entity(
            KnowledgeType::CodePattern,
            "proj1",
            &["cache", "async"],
            "Cache results with an async loader",
        );
        let b = entity(
            KnowledgeType::CodePattern,
            "proj1",
            &["cache", "util"],
            "Cache results in a util helper",
        );

        let breakdown = score_entities(&a, &b, None, None);
        assert_eq!(breakdown.type_score, 1.0);
        assert_eq!(breakdown.tag_score, Some(0.5));
        // {cache, results, with, async, loader} vs {cache, results, util, helper}
        assert!((breakdown.content_score - 2.0 / 7.0).abs() < 1e-12);
        assert_eq!(breakdown.project_score, 0.8);

        let expected = (1.0 + 0.5 + 2.0 / 7.0 + 0.8) / 4.0;
        assert!((breakdown.score() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_untagged_entities_use_three_factors() {
        let a = entity(KnowledgeType::Solution, "p", &[], "");
        let b = entity(KnowledgeType::Algorithm, "p", &["x"], "");

        let breakdown = score_entities(&a, &b, None, None);
        assert_eq!(breakdown.factor_count(), 3);
        assert!((breakdown.score() - (0.2 + 0.0 + 0.8) / 3.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_scorer_is_symmetric() {
        let registry = InMemoryProjectRegistry::new();
        registry
            .register(ProjectInfo::new("p1", "One").with_languages(["rust"]))
            .await;
        registry
            .register(ProjectInfo::new("p2", "Two").with_languages(["Rust", "sql"]))
            .await;

        let a = entity(
            KnowledgeType::CodePattern,
            "p1",
            &["db", "pool"],
            "Pool database connections",
        );
        let b = entity(
            KnowledgeType::Solution,
            "p2",
            &["db"],
            "Database connection pooling fix",
        );

        let mut scorer = SimilarityScorer::new(&registry);
        let ab = scorer.similarity(&a, &b).await.unwrap();
        let ba = scorer.similarity(&b, &a).await.unwrap();
        assert_eq!(ab, ba);

        let breakdown = scorer.breakdown(&a, &b).await.unwrap();
        assert_eq!(breakdown.project_score, SHARED_LANGUAGE_SCORE);
        assert_eq!(scorer.cached_projects(), 2);
    }

    #[tokio::test]
    async fn test_scorer_unknown_project() {
        let registry = InMemoryProjectRegistry::new();
        let a = entity(KnowledgeType::CodePattern, "p1", &[], "");
        let b = entity(KnowledgeType::CodePattern, "p2", &[], "");

        let mut scorer = SimilarityScorer::new(&registry);
        let breakdown = scorer.breakdown(&a, &b).await.unwrap();
        assert_eq!(breakdown.project_score, UNRELATED_PROJECT_SCORE);
    }

    #[tokio::test]
    async fn test_registry_failure_names_project() {
        let a = entity(KnowledgeType::CodePattern, "p1", &[], "");
        let b = entity(KnowledgeType::CodePattern, "p2", &[], "");

        let mut scorer = SimilarityScorer::new(&OfflineRegistry);
        let err = scorer.breakdown(&a, &b).await.unwrap_err();
        assert!(matches!(
            err,
            Error::RegistryLookupFailed(ref project, ref reason)
                if project == "p1" && reason.contains("registry offline")
        ));
        assert_eq!(err.code(), "E200");

        // Same-project pairs never reach the registry
        let c = entity(KnowledgeType::CodePattern, "p1", &[], "");
        assert!(scorer.breakdown(&a, &c).await.is_ok());
    }
}
