//! Diversity of the sampled paths for a single pair

use crate::stats::{clamp01, coefficient_of_variation, geometric_mean_nonzero, normalized_entropy};
use petgraph::graph::NodeIndex;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct PairMetrics {
    /// Mean Jaccard distance between the node sets of every two paths
    pub jaccard: f64,
    /// Entropy of path lengths, normalized by `ln(paths)`
    pub length_entropy: f64,
    /// Coefficient of variation of path lengths, clamped to 1
    pub length_cv: f64,
    /// Zero-excluding geometric mean of the three
    pub diversity: f64,
}

/// Score the paths sampled for one pair; fewer than two paths carry no diversity
pub(super) fn pair_metrics(paths: &[Vec<NodeIndex>]) -> PairMetrics {
    if paths.len() < 2 {
        return PairMetrics {
            jaccard: 0.0,
            length_entropy: 0.0,
            length_cv: 0.0,
            diversity: 0.0,
        };
    }

    let sets: Vec<HashSet<NodeIndex>> = paths
        .iter()
        .map(|p| p.iter().copied().collect())
        .collect();
    let mut distance_sum = 0.0;
    let mut comparisons = 0usize;
    for (i, a) in sets.iter().enumerate() {
        for b in &sets[i + 1..] {
            let union = a.union(b).count();
            if union > 0 {
                distance_sum += 1.0 - a.intersection(b).count() as f64 / union as f64;
            }
            comparisons += 1;
        }
    }
    let jaccard = distance_sum / comparisons as f64;

    let lengths: Vec<usize> = paths.iter().map(|p| p.len().saturating_sub(1)).collect();
    let length_entropy = normalized_entropy(lengths.iter().copied(), paths.len());
    let length_cv = clamp01(coefficient_of_variation(
        &lengths.iter().map(|l| *l as f64).collect::<Vec<_>>(),
    ));

    PairMetrics {
        jaccard,
        length_entropy,
        length_cv,
        diversity: geometric_mean_nonzero(&[jaccard, length_entropy, length_cv]),
    }
}
