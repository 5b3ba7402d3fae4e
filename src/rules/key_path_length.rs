//! Key path length rule
//!
//! The key path runs from the entrance to the exit (see [`crate::entrance`]).
//! Its hop length is normalized by the entrance's eccentricity, the farthest
//! any node is from the entrance, and scored as `exp(-normalized)`: short
//! critical paths relative to the level's depth score higher.

use super::base::{Rule, RuleCategory, RuleOutcome};
use crate::entrance;
use crate::graph::LevelGraph;
use crate::models::Level;
use anyhow::Result;
use serde_json::json;

pub struct KeyPathLengthRule;

impl Rule for KeyPathLengthRule {
    fn name(&self) -> &'static str {
        "key_path_length"
    }

    fn description(&self) -> &'static str {
        "Entrance-to-exit distance relative to how deep the level runs"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn evaluate_level(&self, level: &Level) -> Result<RuleOutcome> {
        let graph = LevelGraph::from_connections(level);
        if graph.edge_count() == 0 {
            return Ok(RuleOutcome::missing("no rooms or connections"));
        }
        let Some(ee) = entrance::identify(level, &graph) else {
            return Ok(RuleOutcome::missing("no rooms or connections"));
        };

        let mut detail = json!({
            "entrance": ee.entrance,
            "exit": ee.exit,
            "entrance_strategy": ee.entrance_strategy,
            "exit_strategy": ee.exit_strategy,
        });
        let zero = |mut detail: serde_json::Value, reason: &str| -> Result<RuleOutcome> {
            detail["reason"] = json!(reason);
            Ok(RuleOutcome::new(0.0, detail))
        };

        if ee.entrance == ee.exit {
            return zero(detail, "entrance and exit coincide");
        }
        let (Some(start), Some(goal)) = (graph.index_of(&ee.entrance), graph.index_of(&ee.exit))
        else {
            return zero(detail, "entrance or exit is not connected");
        };

        let distances = graph.bfs_distances(start);
        let Some(path_length) = distances.get(goal.index()).copied().flatten() else {
            return zero(detail, "exit is unreachable from the entrance");
        };
        let eccentricity = distances.iter().flatten().copied().max().unwrap_or(0);
        if eccentricity == 0 {
            return zero(detail, "entrance has no reachable neighbours");
        }

        let normalized = path_length as f64 / eccentricity as f64;
        let score = (-normalized).exp();

        detail["path_length"] = json!(path_length);
        detail["entrance_eccentricity"] = json!(eccentricity);
        detail["normalized_length"] = json!(normalized);
        Ok(RuleOutcome::new(score, detail))
    }
}
