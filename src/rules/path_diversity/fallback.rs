//! Structural estimate used when no random walk succeeds

use crate::graph::LevelGraph;
use crate::stats::{clamp01, coefficient_of_variation, geometric_mean_nonzero, normalized_entropy};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct StructuralEstimate {
    /// Entropy of node membership across connected components
    pub component_entropy: f64,
    /// Entropy of the degree distribution
    pub degree_entropy: f64,
    /// Coefficient of variation of sampled shortest-path distances
    pub distance_cv: f64,
    pub score: f64,
}

pub(super) fn structural_diversity<R: Rng + ?Sized>(
    graph: &LevelGraph,
    samples: usize,
    rng: &mut R,
) -> StructuralEstimate {
    let n = graph.node_count();

    let components = graph.connected_components();
    let membership = components
        .iter()
        .enumerate()
        .flat_map(|(c, nodes)| std::iter::repeat(c).take(nodes.len()));
    let component_entropy = normalized_entropy(membership, components.len());

    let degrees: Vec<usize> = graph.node_indices().map(|idx| graph.degree(idx)).collect();
    let max_degree = degrees.iter().copied().max().unwrap_or(0);
    let degree_entropy = normalized_entropy(degrees.iter().copied(), n.min(max_degree + 1));

    let mut distances = Vec::new();
    if n >= 2 {
        let nodes: Vec<_> = graph.node_indices().collect();
        for _ in 0..samples {
            let a = nodes[rng.random_range(0..n)];
            let b = nodes[rng.random_range(0..n)];
            if a == b {
                continue;
            }
            if let Some(d) = graph.shortest_distance(a, b) {
                distances.push(d as f64);
            }
        }
    }
    let distance_cv = clamp01(coefficient_of_variation(&distances));

    StructuralEstimate {
        component_entropy,
        degree_entropy,
        distance_cv,
        score: geometric_mean_nonzero(&[component_entropy, degree_entropy, distance_cv]),
    }
}
