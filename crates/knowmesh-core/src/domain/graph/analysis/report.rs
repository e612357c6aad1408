//! Analysis report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::graph::GraphModel;

use super::centrality::CentralityReport;
use super::community::CommunityReport;
use super::flow::KnowledgeFlowReport;
use super::statistics::GraphStatistics;

/// Everything computed by one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// ID of the analyzed graph
    pub graph_id: String,
    /// When the analysis ran
    pub analyzed_at: DateTime<Utc>,
    /// Strength threshold the analysis used
    pub min_strength: f64,
    pub statistics: GraphStatistics,
    pub centrality: CentralityReport,
    /// Present when community detection was enabled
    pub communities: Option<CommunityReport>,
    /// Present when flow analysis was enabled
    pub knowledge_flow: Option<KnowledgeFlowReport>,
    pub insights: Vec<String>,
}

impl AnalysisReport {
    /// Write centrality and community labels back onto the graph's nodes
    ///
    /// Returns the number of nodes updated. Nodes unknown to the report are
    /// left untouched.
    pub fn annotate(&self, graph: &mut GraphModel) -> usize {
        let mut updated = 0;
        for (id, node) in graph.nodes.iter_mut() {
            let centrality = self.centrality.node_scores.get(id).copied();
            let community = self
                .communities
                .as_ref()
                .and_then(|c| c.assignments.get(id).cloned());

            if centrality.is_none() && community.is_none() {
                continue;
            }
            if centrality.is_some() {
                node.metadata.centrality = centrality;
            }
            if community.is_some() {
                node.metadata.community = community;
            }
            updated += 1;
        }
        updated
    }

    /// Serialize the report as pretty JSON
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
