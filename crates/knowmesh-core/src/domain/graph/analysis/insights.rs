//! Narrative insights
//!
//! Observations come first (size, connectivity, dominant type, project
//! spread, central node, communities, transfer paths), followed by
//! recommendations.

use super::centrality::CentralityReport;
use super::community::CommunityReport;
use super::flow::KnowledgeFlowReport;
use super::statistics::GraphStatistics;

/// Below this modularity the community structure is considered weak
pub const WEAK_MODULARITY: f64 = 0.3;

/// Build insight strings from computed analysis blocks
pub fn generate_insights(
    statistics: &GraphStatistics,
    centrality: &CentralityReport,
    communities: Option<&CommunityReport>,
    knowledge_flow: Option<&KnowledgeFlowReport>,
) -> Vec<String> {
    let mut insights = Vec::new();

    insights.push(format!(
        "The knowledge graph contains {} nodes and {} relationships (average degree {:.2})",
        statistics.node_count, statistics.relationship_count, statistics.average_degree
    ));

    if statistics.connected_components <= 1 {
        insights.push("The knowledge graph is fully connected".to_string());
    } else {
        insights.push(format!(
            "The knowledge graph has {} disconnected components",
            statistics.connected_components
        ));
    }

    if statistics.node_count > 0 {
        if let Some((kind, count)) = statistics.dominant_knowledge_type() {
            insights.push(format!(
                "Most knowledge is of type \"{}\" ({:.1}% of nodes)",
                kind,
                percentage(count, statistics.node_count)
            ));
        }

        insights.push(format!(
            "Knowledge spans {} project(s)",
            statistics.project_count()
        ));

        if let Some(top) = centrality.most_central() {
            insights.push(format!(
                "\"{}\" is the most central node (degree centrality {:.2})",
                top.title, top.score
            ));
        }
    }

    if let Some(largest) = communities.and_then(|c| c.largest()) {
        let count = communities.map_or(0, |c| c.communities.len());
        insights.push(format!(
            "Detected {} communities; the largest holds {:.1}% of nodes",
            count,
            percentage(largest.size, statistics.node_count)
        ));
    }

    if let Some(flow) = knowledge_flow {
        if let Some(strongest) = flow.strongest_path() {
            insights.push(format!(
                "Found {} knowledge transfer path(s); strongest is {} -> {} ({:.2})",
                flow.transfer_paths.len(),
                strongest.source_project,
                strongest.target_project,
                strongest.strength
            ));
        }
    }

    if statistics.connected_components > 1 {
        insights.push(
            "Consider linking disconnected components to improve knowledge reuse".to_string(),
        );
    }

    if let Some(flow) = knowledge_flow {
        if statistics.project_count() > 1 && flow.transfer_paths.is_empty() {
            insights.push(
                "Consider establishing knowledge transfer between projects".to_string(),
            );
        }
    }

    if let Some(report) = communities {
        if report.modularity < WEAK_MODULARITY && statistics.relationship_count > 0 {
            insights.push(
                "Community structure is weak; consider restructuring related knowledge"
                    .to_string(),
            );
        }
    }

    insights
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}
