//! Loop ratio rule
//!
//! Rewards levels with some, but not too many, alternative routes. Cycles are
//! counted as DFS back edges and divided by the node count; the ratio is
//! scored with a Gaussian centred on 0.3.

use super::base::{Rule, RuleCategory, RuleOutcome};
use crate::graph::LevelGraph;
use crate::models::Level;
use crate::stats::gaussian;
use anyhow::Result;
use serde_json::json;

/// Cycles per node at which the score peaks
const IDEAL_LOOP_RATIO: f64 = 0.3;
const LOOP_RATIO_SIGMA: f64 = 0.12;

pub struct LoopRatioRule;

impl Rule for LoopRatioRule {
    fn name(&self) -> &'static str {
        "loop_ratio"
    }

    fn description(&self) -> &'static str {
        "Independent cycles per node, peaking at a moderate amount of looping"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn evaluate_level(&self, level: &Level) -> Result<RuleOutcome> {
        let graph = LevelGraph::from_connections(level);
        if graph.is_empty() {
            return Ok(RuleOutcome::missing("no rooms or connections"));
        }

        let cycles = graph.cycle_count();
        let ratio = cycles as f64 / graph.node_count() as f64;
        let score = gaussian(ratio, IDEAL_LOOP_RATIO, LOOP_RATIO_SIGMA);

        Ok(RuleOutcome::new(
            score,
            json!({
                "cycles": cycles,
                "nodes": graph.node_count(),
                "loop_ratio": ratio,
                "ideal_ratio": IDEAL_LOOP_RATIO,
            }),
        ))
    }
}
