//! Structural statistics

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::AnalysisView;

/// Size, connectivity and distribution figures for a graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    /// Number of nodes
    pub node_count: usize,
    /// Number of relationships that passed the strength filter
    pub relationship_count: usize,
    /// Mean filtered degree
    pub average_degree: f64,
    /// `2E / (N * (N - 1))`, zero below two nodes
    pub density: f64,
    /// Connected components over undirected filtered edges
    pub connected_components: usize,
    /// Nodes per knowledge type
    pub knowledge_type_distribution: BTreeMap<String, usize>,
    /// Filtered relationships per relationship type
    pub relationship_type_distribution: BTreeMap<String, usize>,
    /// Nodes per source project
    pub project_distribution: BTreeMap<String, usize>,
}

impl GraphStatistics {
    /// Most frequent knowledge type with its count; ties resolve alphabetically
    pub fn dominant_knowledge_type(&self) -> Option<(&str, usize)> {
        let mut best: Option<(&str, usize)> = None;
        for (kind, &count) in &self.knowledge_type_distribution {
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((kind.as_str(), count));
            }
        }
        best
    }

    /// Number of distinct projects
    pub fn project_count(&self) -> usize {
        self.project_distribution.len()
    }
}

/// Compute statistics over a filtered view
pub fn compute_statistics(view: &AnalysisView<'_>) -> GraphStatistics {
    let node_count = view.node_count();
    let relationship_count = view.edges.len();

    let average_degree = if node_count == 0 {
        0.0
    } else {
        view.degrees.values().sum::<usize>() as f64 / node_count as f64
    };

    let density = if node_count < 2 {
        0.0
    } else {
        (2 * relationship_count) as f64 / (node_count * (node_count - 1)) as f64
    };

    let mut knowledge_type_distribution = BTreeMap::new();
    let mut project_distribution = BTreeMap::new();
    for node in view.graph.nodes.values() {
        *knowledge_type_distribution
            .entry(node.entity.knowledge_type.to_string())
            .or_insert(0) += 1;
        *project_distribution
            .entry(node.project().to_string())
            .or_insert(0) += 1;
    }

    let mut relationship_type_distribution = BTreeMap::new();
    for edge in &view.edges {
        *relationship_type_distribution
            .entry(edge.relationship_type.to_string())
            .or_insert(0) += 1;
    }

    GraphStatistics {
        node_count,
        relationship_count,
        average_degree,
        density,
        connected_components: count_components(view),
        knowledge_type_distribution,
        relationship_type_distribution,
        project_distribution,
    }
}

/// Iterative depth-first search over the undirected adjacency
fn count_components(view: &AnalysisView<'_>) -> usize {
    let mut visited: HashSet<&str> = HashSet::with_capacity(view.adjacency.len());
    let mut components = 0;

    for &start in view.adjacency.keys() {
        if !visited.insert(start) {
            continue;
        }
        components += 1;

        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            for &next in view.adjacency.get(current).into_iter().flatten() {
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }
    }

    components
}
