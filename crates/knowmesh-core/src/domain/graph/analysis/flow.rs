//! Cross-project knowledge flow
//!
//! A relationship whose endpoints live in different projects moves
//! knowledge from the source node's project to the target node's project.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::AnalysisView;

/// A project is a source (or sink) when its outgoing (or incoming) count
/// exceeds the other direction by this factor
pub const FLOW_RATIO: f64 = 1.5;

/// Direction a project's knowledge mostly moves in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    /// Mostly exports knowledge
    Source,
    /// Mostly imports knowledge
    Sink,
    /// Neither direction dominates
    Balanced,
}

impl ProjectRole {
    /// Classify from cross-project edge counts
    pub fn classify(outgoing: usize, incoming: usize) -> Self {
        let (outgoing, incoming) = (outgoing as f64, incoming as f64);
        if outgoing > incoming * FLOW_RATIO {
            Self::Source
        } else if incoming > outgoing * FLOW_RATIO {
            Self::Sink
        } else {
            Self::Balanced
        }
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Sink => "sink",
            Self::Balanced => "balanced",
        }
    }
}

impl std::fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cross-project edge counts for one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFlow {
    pub project_id: String,
    pub outgoing: usize,
    pub incoming: usize,
    pub role: ProjectRole,
}

/// Aggregated cross-project edges for one ordered project pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferPath {
    pub source_project: String,
    pub target_project: String,
    /// Number of relationships on the path
    pub relationship_count: usize,
    /// Mean strength of those relationships
    pub strength: f64,
    /// Knowledge types of the source nodes, first seen first
    pub knowledge_types: Vec<String>,
}

/// Result of flow analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeFlowReport {
    /// Every project with nodes in the graph, in node order
    pub projects: Vec<ProjectFlow>,
    /// Projects classified as sources
    pub sources: Vec<String>,
    /// Projects classified as sinks
    pub sinks: Vec<String>,
    /// Knowledge types that crossed a project boundary
    pub flowing_types: Vec<String>,
    /// Strongest path first
    pub transfer_paths: Vec<TransferPath>,
}

impl KnowledgeFlowReport {
    /// Strongest transfer path, if any
    pub fn strongest_path(&self) -> Option<&TransferPath> {
        self.transfer_paths.first()
    }

    /// Number of cross-project relationships
    pub fn cross_project_count(&self) -> usize {
        self.transfer_paths.iter().map(|p| p.relationship_count).sum()
    }
}

#[derive(Default)]
struct PathAccumulator<'a> {
    count: usize,
    total_strength: f64,
    knowledge_types: IndexSet<&'a str>,
}

/// Analyze knowledge movement between projects
pub fn analyze_flow(view: &AnalysisView<'_>) -> KnowledgeFlowReport {
    let mut counts: IndexMap<&str, (usize, usize)> = IndexMap::new();
    for node in view.graph.nodes.values() {
        counts.entry(node.project()).or_insert((0, 0));
    }

    let mut flowing_types: IndexSet<&str> = IndexSet::new();
    let mut paths: IndexMap<(&str, &str), PathAccumulator<'_>> = IndexMap::new();

    for edge in &view.edges {
        let (Some(source), Some(target)) = (
            view.graph.node(&edge.source_id),
            view.graph.node(&edge.target_id),
        ) else {
            continue;
        };
        let (from, to) = (source.project(), target.project());
        if from == to {
            continue;
        }

        counts.entry(from).or_insert((0, 0)).0 += 1;
        counts.entry(to).or_insert((0, 0)).1 += 1;

        let kind = source.entity.knowledge_type.as_str();
        flowing_types.insert(kind);

        let path = paths.entry((from, to)).or_default();
        path.count += 1;
        path.total_strength += edge.strength;
        path.knowledge_types.insert(kind);
    }

    let projects: Vec<ProjectFlow> = counts
        .into_iter()
        .map(|(project, (outgoing, incoming))| ProjectFlow {
            project_id: project.to_string(),
            outgoing,
            incoming,
            role: ProjectRole::classify(outgoing, incoming),
        })
        .collect();

    let with_role = |role: ProjectRole| -> Vec<String> {
        projects
            .iter()
            .filter(|p| p.role == role)
            .map(|p| p.project_id.clone())
            .collect()
    };
    let sources = with_role(ProjectRole::Source);
    let sinks = with_role(ProjectRole::Sink);

    let mut transfer_paths: Vec<TransferPath> = paths
        .into_iter()
        .map(|((from, to), acc)| TransferPath {
            source_project: from.to_string(),
            target_project: to.to_string(),
            relationship_count: acc.count,
            strength: acc.total_strength / acc.count as f64,
            knowledge_types: acc.knowledge_types.into_iter().map(str::to_string).collect(),
        })
        .collect();
    transfer_paths.sort_by(|a, b| b.strength.total_cmp(&a.strength));

    KnowledgeFlowReport {
        projects,
        sources,
        sinks,
        flowing_types: flowing_types.into_iter().map(str::to_string).collect(),
        transfer_paths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::analysis::test_support::TestGraph;
    use crate::domain::knowledge::KnowledgeType;

    #[test]
    fn test_one_way_transfer() {
        let graph = TestGraph::new()
            .typed_node("a1", "P1", KnowledgeType::Algorithm)
            .typed_node("a2", "P1", KnowledgeType::Solution)
            .typed_node("a3", "P1", KnowledgeType::Algorithm)
            .node("b1", "P2")
            .edge("a1", "b1", 0.9)
            .edge("a2", "b1", 0.8)
            .edge("a3", "b1", 0.7)
            .build();
        let report = analyze_flow(&AnalysisView::new(&graph, 0.3));

        assert_eq!(report.sources, vec!["P1"]);
        assert_eq!(report.sinks, vec!["P2"]);
        assert_eq!(report.transfer_paths.len(), 1);

        let path = report.strongest_path().unwrap();
        assert_eq!(path.source_project, "P1");
        assert_eq!(path.target_project, "P2");
        assert_eq!(path.relationship_count, 3);
        assert!((path.strength - 0.8).abs() < 1e-9);
        assert_eq!(path.knowledge_types, vec!["algorithm", "solution"]);
        assert_eq!(report.flowing_types, vec!["algorithm", "solution"]);
        assert_eq!(report.cross_project_count(), 3);
    }

    #[test]
    fn test_same_project_edges_are_ignored() {
        let graph = TestGraph::new()
            .node("a", "P1")
            .node("b", "P1")
            .edge("a", "b", 0.9)
            .build();
        let report = analyze_flow(&AnalysisView::new(&graph, 0.3));

        assert!(report.transfer_paths.is_empty());
        assert!(report.sources.is_empty());
        assert_eq!(report.projects.len(), 1);
        assert_eq!(report.projects[0].role, ProjectRole::Balanced);
    }

    #[test]
    fn test_paths_sorted_by_strength() {
        let graph = TestGraph::new()
            .node("a", "P1")
            .node("b", "P2")
            .node("c", "P3")
            .edge("a", "b", 0.4)
            .edge("b", "c", 0.9)
            .edge("c", "a", 0.6)
            .build();
        let report = analyze_flow(&AnalysisView::new(&graph, 0.3));

        let order: Vec<(&str, &str)> = report
            .transfer_paths
            .iter()
            .map(|p| (p.source_project.as_str(), p.target_project.as_str()))
            .collect();
        assert_eq!(order, vec![("P2", "P3"), ("P3", "P1"), ("P1", "P2")]);
        assert!(report.sources.is_empty());
        assert!(report.sinks.is_empty());
    }

    #[test]
    fn test_role_classification() {
        assert_eq!(ProjectRole::classify(3, 2), ProjectRole::Balanced);
        assert_eq!(ProjectRole::classify(4, 2), ProjectRole::Source);
        assert_eq!(ProjectRole::classify(0, 1), ProjectRole::Sink);
        assert_eq!(ProjectRole::classify(0, 0), ProjectRole::Balanced);
        assert_eq!(ProjectRole::Sink.to_string(), "sink");
    }
}
