//! Base rule trait and types
//!
//! This module defines the core abstractions for quality scoring:
//! - `Rule` trait that all metrics must implement
//! - `RuleOutcome` for the score and detail a rule produces
//! - `RuleResult` for capturing execution results in the assessor
//! - `aggregate_levels` for scoring multi-level documents

use crate::models::{Dungeon, Level};
use crate::stats::{clamp01, mean};
use anyhow::Result;
use serde_json::{json, Value};

/// Score and detail produced by one rule for one document
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    /// Score in [0, 1]
    pub score: f64,
    /// Rule-specific breakdown, always a JSON object
    pub detail: Value,
}

impl RuleOutcome {
    /// Create an outcome; the score is clamped and non-finite values become 0
    pub fn new(score: f64, detail: Value) -> Self {
        Self {
            score: finite_score(score),
            detail,
        }
    }

    /// Zero score for a document the rule cannot measure
    pub fn missing(reason: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            detail: json!({ "reason": reason.into() }),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        self.detail.get("reason").and_then(Value::as_str)
    }
}

/// Clamp to [0, 1]; NaN and infinities become 0
pub fn finite_score(score: f64) -> f64 {
    if score.is_finite() {
        clamp01(score)
    } else {
        0.0
    }
}

/// Result from running a single rule
#[derive(Debug, Clone)]
pub struct RuleResult {
    /// Name of the rule that produced this result
    pub rule_name: String,
    pub score: f64,
    pub detail: Value,
    /// Execution time in milliseconds
    pub duration_ms: u64,
    /// Whether the rule completed successfully
    pub success: bool,
    /// Error message if the rule failed
    pub error: Option<String>,
}

impl RuleResult {
    /// Create a successful result
    pub fn success(rule_name: String, outcome: RuleOutcome, duration_ms: u64) -> Self {
        Self {
            rule_name,
            score: outcome.score,
            detail: outcome.detail,
            duration_ms,
            success: true,
            error: None,
        }
    }

    /// Create a failed result; the rule scores 0 and the detail carries the error
    pub fn failure(rule_name: String, error: String, duration_ms: u64) -> Self {
        Self {
            rule_name,
            score: 0.0,
            detail: json!({ "error": error }),
            duration_ms,
            success: false,
            error: Some(error),
        }
    }
}

/// Grouping used when listing rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    /// Connectivity and navigation
    Structure,
    /// Placement of treasure and monsters
    Gameplay,
    /// Visual layout
    Aesthetic,
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleCategory::Structure => write!(f, "structure"),
            RuleCategory::Gameplay => write!(f, "gameplay"),
            RuleCategory::Aesthetic => write!(f, "aesthetic"),
        }
    }
}

/// Trait for all quality rules
///
/// Rules are independent metrics. Each maps a document to a score in [0, 1]
/// plus a JSON detail object; a rule never fails the whole assessment, the
/// assessor turns errors and panics into a zero score.
///
/// Most rules only need `evaluate_level`; the default `evaluate` averages it
/// over every level that has nodes.
pub trait Rule: Send + Sync {
    /// Unique identifier, also the key in `QualityReport::scores`
    fn name(&self) -> &'static str;

    /// Human-readable description of what this rule measures
    fn description(&self) -> &'static str;

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    /// Score a single level
    fn evaluate_level(&self, level: &Level) -> Result<RuleOutcome>;

    /// Score a whole document
    fn evaluate(&self, dungeon: &Dungeon) -> Result<RuleOutcome> {
        aggregate_levels(dungeon, |level| self.evaluate_level(level))
    }
}

/// Apply `score_level` to every level with at least one node.
///
/// One evaluable level returns its outcome unchanged. Several levels score
/// their mean, with per-level outcomes listed under `levels` in the detail.
pub fn aggregate_levels<F>(dungeon: &Dungeon, mut score_level: F) -> Result<RuleOutcome>
where
    F: FnMut(&Level) -> Result<RuleOutcome>,
{
    if dungeon.levels.is_empty() {
        return Ok(RuleOutcome::missing("no levels"));
    }

    let evaluable: Vec<&Level> = dungeon
        .levels
        .iter()
        .filter(|l| l.node_count() > 0)
        .collect();

    match evaluable.as_slice() {
        [] => Ok(RuleOutcome::missing("no rooms or corridors")),
        [only] => score_level(only),
        many => {
            let mut scores = Vec::with_capacity(many.len());
            let mut levels = Vec::with_capacity(many.len());
            for level in many {
                let outcome = score_level(level)?;
                scores.push(outcome.score);
                levels.push(json!({
                    "level": level.id,
                    "score": outcome.score,
                    "detail": outcome.detail,
                }));
            }
            Ok(RuleOutcome::new(
                mean(&scores),
                json!({
                    "levels_evaluated": many.len(),
                    "levels": levels,
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Room;

    fn level_with_rooms(id: &str, rooms: usize) -> Level {
        let mut level = Level::new(id);
        for i in 0..rooms {
            level
                .rooms
                .push(Room::new(format!("{id}-{i}"), i as f64 * 10.0, 0.0, 4.0, 4.0));
        }
        level
    }

    fn by_room_count(level: &Level) -> Result<RuleOutcome> {
        Ok(RuleOutcome::new(level.rooms.len() as f64 / 10.0, json!({})))
    }

    #[test]
    fn test_outcome_clamps_and_maps_nan() {
        assert_eq!(RuleOutcome::new(1.5, json!({})).score, 1.0);
        assert_eq!(RuleOutcome::new(f64::NAN, json!({})).score, 0.0);
        assert_eq!(RuleOutcome::new(f64::INFINITY, json!({})).score, 0.0);
        assert_eq!(RuleOutcome::missing("no rooms").reason(), Some("no rooms"));
    }

    #[test]
    fn test_failure_result_scores_zero() {
        let r = RuleResult::failure("accessibility".into(), "boom".into(), 3);
        assert!(!r.success);
        assert_eq!(r.score, 0.0);
        assert_eq!(r.detail["error"], "boom");
    }

    #[test]
    fn test_single_level_passes_through() {
        let dungeon = Dungeon::single_level(level_with_rooms("L1", 3));
        let outcome = aggregate_levels(&dungeon, by_room_count).unwrap();
        assert!((outcome.score - 0.3).abs() < 1e-9);
        assert!(outcome.detail.get("levels").is_none());
    }

    #[test]
    fn test_multi_level_mean_skips_empty_levels() {
        let mut dungeon = Dungeon::single_level(level_with_rooms("L1", 2));
        dungeon.levels.push(level_with_rooms("L2", 0));
        dungeon.levels.push(level_with_rooms("L3", 6));
        let outcome = aggregate_levels(&dungeon, by_room_count).unwrap();
        assert!((outcome.score - 0.4).abs() < 1e-9);
        assert_eq!(outcome.detail["levels_evaluated"], 2);
        assert_eq!(outcome.detail["levels"][1]["level"], "L3");
    }

    #[test]
    fn test_no_levels_or_nodes() {
        let empty = Dungeon::default();
        let outcome = aggregate_levels(&empty, by_room_count).unwrap();
        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.reason(), Some("no levels"));

        let hollow = Dungeon::single_level(Level::new("L1"));
        let outcome = aggregate_levels(&hollow, by_room_count).unwrap();
        assert_eq!(outcome.reason(), Some("no rooms or corridors"));
    }
}
