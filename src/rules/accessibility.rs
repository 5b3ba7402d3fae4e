//! Accessibility rule
//!
//! Measures how well the entrance reaches the rest of the level. The score is
//! the zero-excluding geometric mean of three factors:
//!
//! - reachability: largest component / nodes that take part in a connection
//! - normalized average path length: `(diameter - avg) / diameter`
//! - normalized path-length variance: `1 - var / (diameter² / 4)`
//!
//! Distances are BFS hops from the entrance to every other reachable node.
//! The entrance is the first declared room.

use super::base::{Rule, RuleCategory, RuleOutcome};
use crate::graph::LevelGraph;
use crate::models::Level;
use crate::stats::{clamp01, geometric_mean_nonzero, mean, variance};
use anyhow::Result;
use serde_json::json;

pub struct AccessibilityRule;

impl Rule for AccessibilityRule {
    fn name(&self) -> &'static str {
        "accessibility"
    }

    fn description(&self) -> &'static str {
        "How well the entrance reaches the rest of the level"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn evaluate_level(&self, level: &Level) -> Result<RuleOutcome> {
        let graph = LevelGraph::from_connections(level);
        let Some(entrance) = level.rooms.first() else {
            return Ok(RuleOutcome::missing("no rooms or connections"));
        };
        if graph.edge_count() == 0 {
            return Ok(RuleOutcome::missing("no rooms or connections"));
        }

        let start = match graph.index_of(&entrance.id) {
            Some(idx) if graph.degree(idx) > 0 => idx,
            _ => {
                return Ok(RuleOutcome::new(
                    0.0,
                    json!({
                        "reason": "entrance is not connected",
                        "entrance": entrance.id,
                    }),
                ))
            }
        };

        let reachability_ratio =
            graph.largest_component_size() as f64 / graph.node_count() as f64;

        let distances: Vec<f64> = graph
            .bfs_distances(start)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != start.index())
            .filter_map(|(_, d)| d.map(|d| d as f64))
            .collect();
        let diameter = distances.iter().copied().fold(0.0, f64::max);
        let avg = mean(&distances);
        let var = variance(&distances);

        let (normalized_avg, normalized_var) = if diameter > 0.0 {
            (
                clamp01((diameter - avg) / diameter),
                clamp01(1.0 - var / (diameter * diameter / 4.0)),
            )
        } else {
            (0.0, 0.0)
        };

        let score = geometric_mean_nonzero(&[reachability_ratio, normalized_avg, normalized_var]);

        Ok(RuleOutcome::new(
            score,
            json!({
                "entrance": entrance.id,
                "reachability_ratio": reachability_ratio,
                "reachable_nodes": distances.len(),
                "connected_nodes": graph.node_count(),
                "components": graph.connected_components().len(),
                "diameter": diameter,
                "avg_path_length": avg,
                "path_length_variance": var,
                "normalized_avg": normalized_avg,
                "normalized_variance": normalized_var,
            }),
        ))
    }
}
