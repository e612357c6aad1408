//! Community detection by label propagation
//!
//! Every node starts with its own id as label. Each round visits the nodes
//! in a shuffled order and moves a node to the most frequent label among
//! its neighbours, updating in place. A node only switches when that label
//! strictly outnumbers its current one. Rounds stop when nothing changes or
//! after [`MAX_LABEL_ITERATIONS`].

use indexmap::IndexMap;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AnalysisView;

/// Upper bound on propagation rounds
pub const MAX_LABEL_ITERATIONS: usize = 10;

/// A group of nodes sharing a label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    /// Final label (the id of the node that seeded it)
    pub id: String,
    /// Member node ids in node order
    pub members: Vec<String>,
    pub size: usize,
}

/// Result of community detection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityReport {
    /// Largest community first
    pub communities: Vec<Community>,
    /// Fraction of filtered relationships inside a single community
    pub modularity: f64,
    /// Rounds executed
    pub iterations: usize,
    /// Whether a round finished without changes
    pub converged: bool,
    /// Community label per node, in node order
    pub assignments: IndexMap<String, String>,
}

impl CommunityReport {
    /// Largest community, if any
    pub fn largest(&self) -> Option<&Community> {
        self.communities.first()
    }
}

/// Run label propagation over a view
pub fn detect_communities<R: Rng + ?Sized>(
    view: &AnalysisView<'_>,
    rng: &mut R,
) -> CommunityReport {
    let (labels, iterations, converged) = propagate_labels(&view.adjacency, rng);

    let mut grouped: IndexMap<&str, Vec<String>> = IndexMap::new();
    for (&node, &label) in &labels {
        grouped.entry(label).or_default().push(node.to_string());
    }

    let mut communities: Vec<Community> = grouped
        .into_iter()
        .map(|(label, members)| Community {
            id: label.to_string(),
            size: members.len(),
            members,
        })
        .collect();
    communities.sort_by(|a, b| b.size.cmp(&a.size));

    let modularity = if view.edges.is_empty() {
        0.0
    } else {
        let intra = view
            .edges
            .iter()
            .filter(|edge| {
                labels.get(edge.source_id.as_str()) == labels.get(edge.target_id.as_str())
            })
            .count();
        intra as f64 / view.edges.len() as f64
    };

    debug!(
        communities = communities.len(),
        iterations,
        converged,
        modularity,
        "Label propagation finished"
    );

    CommunityReport {
        communities,
        modularity,
        iterations,
        converged,
        assignments: labels
            .into_iter()
            .map(|(node, label)| (node.to_string(), label.to_string()))
            .collect(),
    }
}

/// Propagate labels over an undirected adjacency
///
/// Returns the label of every node (in adjacency order), the number of
/// rounds run and whether the labels settled.
pub fn propagate_labels<'a, R: Rng + ?Sized>(
    adjacency: &IndexMap<&'a str, Vec<&'a str>>,
    rng: &mut R,
) -> (IndexMap<&'a str, &'a str>, usize, bool) {
    let mut labels: IndexMap<&'a str, &'a str> =
        adjacency.keys().map(|&node| (node, node)).collect();
    let mut order: Vec<&'a str> = adjacency.keys().copied().collect();

    let mut iterations = 0;
    let mut converged = adjacency.is_empty();

    while !converged && iterations < MAX_LABEL_ITERATIONS {
        iterations += 1;
        order.shuffle(rng);

        let mut changes = 0;
        for &node in &order {
            let Some(neighbors) = adjacency.get(node) else {
                continue;
            };
            if neighbors.is_empty() {
                continue;
            }

            let mut counts: IndexMap<&'a str, usize> = IndexMap::new();
            for neighbor in neighbors {
                if let Some(&label) = labels.get(neighbor) {
                    *counts.entry(label).or_insert(0) += 1;
                }
            }

            let current = labels.get(node).copied().unwrap_or(node);
            if let Some(label) = choose_label(&counts, current) {
                labels.insert(node, label);
                changes += 1;
            }
        }

        if changes == 0 {
            converged = true;
        }
    }

    (labels, iterations, converged)
}

/// Pick the label a node should switch to
///
/// The first label (in tally order) reaching the highest count wins, and
/// only if that count is strictly greater than the current label's count.
/// Returns `None` when the node keeps its current label.
pub fn choose_label<'a>(counts: &IndexMap<&'a str, usize>, current: &str) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for (&label, &count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((label, count));
        }
    }

    let current_count = counts.get(current).copied().unwrap_or(0);
    best.filter(|&(_, count)| count > current_count).map(|(label, _)| label)
}
