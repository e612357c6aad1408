//! Centrality rankings
//!
//! Only degree centrality is computed. The betweenness and closeness lists
//! carry the same ranking so consumers can rely on all three keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::AnalysisView;

/// One ranked node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityScore {
    pub node_id: String,
    pub title: String,
    pub score: f64,
}

/// Top-K centrality rankings plus the full per-node scores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CentralityReport {
    /// Highest degree centrality first
    pub degree: Vec<CentralityScore>,
    /// Mirrors `degree`
    pub betweenness: Vec<CentralityScore>,
    /// Mirrors `degree`
    pub closeness: Vec<CentralityScore>,
    /// Degree centrality for every node, in node order
    pub node_scores: IndexMap<String, f64>,
}

impl CentralityReport {
    /// Highest ranked node, if any
    pub fn most_central(&self) -> Option<&CentralityScore> {
        self.degree.first()
    }
}

/// Degree centrality: `degree / (N - 1)`, zero below two nodes
pub fn compute_centrality(view: &AnalysisView<'_>, top_k: usize) -> CentralityReport {
    let node_count = view.node_count();
    let denominator = node_count.saturating_sub(1);

    let node_scores: IndexMap<String, f64> = view
        .graph
        .nodes
        .keys()
        .map(|id| {
            let score = if denominator == 0 {
                0.0
            } else {
                view.degree(id) as f64 / denominator as f64
            };
            (id.clone(), score)
        })
        .collect();

    let mut ranked: Vec<CentralityScore> = node_scores
        .iter()
        .map(|(id, &score)| CentralityScore {
            node_id: id.clone(),
            title: view
                .graph
                .node(id)
                .map(|node| node.title().to_string())
                .unwrap_or_default(),
            score,
        })
        .collect();
    // Stable: equal scores keep node order
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(top_k);

    CentralityReport {
        betweenness: ranked.clone(),
        closeness: ranked.clone(),
        degree: ranked,
        node_scores,
    }
}
