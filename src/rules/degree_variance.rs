//! Degree variance rule
//!
//! Levels where every room has the same number of exits feel flat; levels
//! dominated by one hub feel like a spoke diagram. The population variance of
//! node degrees (isolated nodes included, at degree 0) is scored with a
//! Gaussian centred on 1.0 and scaled by the complexity factor.

use super::base::{Rule, RuleCategory, RuleOutcome};
use crate::graph::LevelGraph;
use crate::models::Level;
use crate::stats::{complexity_factor, gaussian, mean, variance};
use anyhow::Result;
use serde_json::json;

const IDEAL_DEGREE_VARIANCE: f64 = 1.0;
const DEGREE_VARIANCE_SIGMA: f64 = 1.0;

pub struct DegreeVarianceRule;

impl Rule for DegreeVarianceRule {
    fn name(&self) -> &'static str {
        "degree_variance"
    }

    fn description(&self) -> &'static str {
        "Variety in the number of connections per node"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn evaluate_level(&self, level: &Level) -> Result<RuleOutcome> {
        let graph = LevelGraph::from_level(level);
        if graph.is_empty() {
            return Ok(RuleOutcome::missing("no rooms or corridors"));
        }

        let degrees: Vec<f64> = graph
            .node_indices()
            .map(|idx| graph.degree(idx) as f64)
            .collect();
        let var = variance(&degrees);
        let complexity = complexity_factor(level.rooms.len());
        let score = gaussian(var, IDEAL_DEGREE_VARIANCE, DEGREE_VARIANCE_SIGMA) * complexity;

        Ok(RuleOutcome::new(
            score,
            json!({
                "degree_variance": var,
                "mean_degree": mean(&degrees),
                "max_degree": degrees.iter().copied().fold(0.0, f64::max),
                "complexity_factor": complexity,
            }),
        ))
    }
}
