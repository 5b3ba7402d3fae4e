//! Dead-end ratio rule
//!
//! `score = 1 - dead_ends / nodes` over the connection graph, where a dead end
//! is a node with exactly one neighbour. The detail also reports how deep the
//! dead ends run: the hop count back along the corridor chain to the nearest
//! branching node.

use super::base::{Rule, RuleCategory, RuleOutcome};
use crate::graph::LevelGraph;
use crate::models::Level;
use crate::stats::mean;
use anyhow::Result;
use petgraph::graph::NodeIndex;
use serde_json::json;

pub struct DeadEndRatioRule;

impl Rule for DeadEndRatioRule {
    fn name(&self) -> &'static str {
        "dead_end_ratio"
    }

    fn description(&self) -> &'static str {
        "Share of nodes that are not dead ends"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn evaluate_level(&self, level: &Level) -> Result<RuleOutcome> {
        let graph = LevelGraph::from_connections(level);
        if graph.is_empty() {
            return Ok(RuleOutcome::missing("no rooms or connections"));
        }

        let dead_ends: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&idx| graph.degree(idx) == 1)
            .collect();
        let depths: Vec<f64> = dead_ends
            .iter()
            .map(|&leaf| dead_end_depth(&graph, leaf) as f64)
            .collect();

        let n = graph.node_count();
        let score = 1.0 - dead_ends.len() as f64 / n as f64;

        Ok(RuleOutcome::new(
            score,
            json!({
                "dead_ends": dead_ends.len(),
                "total_nodes": n,
                "dead_end_ratio": dead_ends.len() as f64 / n as f64,
                "dead_end_ids": dead_ends.iter().map(|&i| graph.id_of(i)).collect::<Vec<_>>(),
                "avg_dead_end_depth": mean(&depths),
                "max_dead_end_depth": depths.iter().copied().fold(0.0, f64::max),
            }),
        ))
    }
}

/// Hops from `leaf` along a chain of degree-2 nodes until a branch or the chain end
fn dead_end_depth(graph: &LevelGraph, leaf: NodeIndex) -> usize {
    let mut prev: Option<NodeIndex> = None;
    let mut cur = leaf;
    let mut depth = 0;

    while depth < graph.node_count() {
        let onward: Vec<NodeIndex> = graph
            .neighbors(cur)
            .into_iter()
            .filter(|&n| Some(n) != prev)
            .collect();
        let [next] = onward.as_slice() else {
            break;
        };
        prev = Some(cur);
        cur = *next;
        depth += 1;
        if graph.degree(cur) != 2 {
            break;
        }
    }
    depth
}
