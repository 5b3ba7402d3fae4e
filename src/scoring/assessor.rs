//! Quality assessor
//!
//! Runs the rule set against a document and folds the results into a
//! [`QualityReport`]. A failing or panicking rule scores 0 with the error in
//! its detail; the rest of the assessment carries on.

use super::recommendations::{advice_for, NO_ISSUES, RECOMMENDATION_THRESHOLD};
use crate::config::AssessConfig;
use crate::models::{Dungeon, Grade, QualityReport};
use crate::rules::{default_rules, finite_score, Rule, RuleResult};
use crate::spatial::SpatialInference;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub struct QualityAssessor {
    config: AssessConfig,
    rules: Vec<Arc<dyn Rule>>,
}

impl Default for QualityAssessor {
    fn default() -> Self {
        Self::new(AssessConfig::default())
    }
}

impl QualityAssessor {
    /// Assessor with the built-in rules
    pub fn new(config: AssessConfig) -> Self {
        let config = config.sanitized();
        let rules = default_rules(&config);
        Self { config, rules }
    }

    /// Assessor with a custom rule set
    pub fn with_rules(config: AssessConfig, rules: Vec<Arc<dyn Rule>>) -> Self {
        Self {
            config: config.sanitized(),
            rules,
        }
    }

    /// Add a rule after the existing ones
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn config(&self) -> &AssessConfig {
        &self.config
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// Score a document. Never fails: unmeasurable input yields zero scores.
    pub fn assess(&self, dungeon: &Dungeon) -> QualityReport {
        let start = Instant::now();

        let document: Cow<'_, Dungeon> = if self.config.enable_spatial_inference {
            let inference = SpatialInference::new(self.config.adjacency_threshold);
            Cow::Owned(inference.enhance(dungeon))
        } else {
            Cow::Borrowed(dungeon)
        };

        let results: Vec<RuleResult> = self
            .rules
            .iter()
            .map(|rule| self.run_single_rule(rule, &document))
            .collect();

        let overall_score = self.weighted_score(&results);
        let grade = Grade::from_score(overall_score);
        let recommendations = recommendations(&results);

        info!(
            "Quality score: {:.3} ({}) from {} rules in {}ms",
            overall_score,
            grade,
            results.len(),
            start.elapsed().as_millis()
        );

        let mut scores = BTreeMap::new();
        let mut details = BTreeMap::new();
        for result in results {
            scores.insert(result.rule_name.clone(), result.score);
            details.insert(result.rule_name, result.detail);
        }

        QualityReport {
            scores,
            details,
            overall_score,
            grade,
            recommendations,
            spatial_inference_used: self.config.enable_spatial_inference,
        }
    }

    fn run_single_rule(&self, rule: &Arc<dyn Rule>, dungeon: &Dungeon) -> RuleResult {
        let name = rule.name().to_string();
        let start = Instant::now();

        debug!("Running rule: {}", name);

        // Wrap in catch_unwind to handle panics
        let outcome =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| rule.evaluate(dungeon)));

        match outcome {
            Ok(Ok(mut outcome)) => {
                let duration = start.elapsed().as_millis() as u64;
                if !outcome.score.is_finite() {
                    warn!("Rule {} produced a non-finite score, using 0", name);
                }
                outcome.score = finite_score(outcome.score);
                debug!("Rule {} scored {:.3} in {}ms", name, outcome.score, duration);
                RuleResult::success(name, outcome, duration)
            }
            Ok(Err(e)) => {
                let duration = start.elapsed().as_millis() as u64;
                warn!("Rule {} failed: {}", name, e);
                RuleResult::failure(name, e.to_string(), duration)
            }
            Err(panic_info) => {
                let duration = start.elapsed().as_millis() as u64;
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                error!("Rule {} panicked: {}", name, panic_msg);
                RuleResult::failure(name, format!("Panic: {}", panic_msg), duration)
            }
        }
    }

    /// Weighted mean over rules with a positive weight; 0 when none has one
    fn weighted_score(&self, results: &[RuleResult]) -> f64 {
        let (weighted, total) = results.iter().fold((0.0, 0.0), |(sum, total), r| {
            let w = self.config.weight(&r.rule_name);
            (sum + w * r.score, total + w)
        });
        if total > 0.0 {
            finite_score(weighted / total)
        } else {
            warn!("No rule has a positive weight, overall score is 0");
            0.0
        }
    }
}

/// Advice for each rule under the threshold, in rule order
fn recommendations(results: &[RuleResult]) -> Vec<String> {
    let advice: Vec<String> = results
        .iter()
        .filter(|r| r.score < RECOMMENDATION_THRESHOLD)
        .map(|r| advice_for(&r.rule_name))
        .collect();
    if advice.is_empty() {
        vec![NO_ISSUES.to_string()]
    } else {
        advice
    }
}

/// Assess with a given configuration
pub fn assess(dungeon: &Dungeon, config: AssessConfig) -> QualityReport {
    QualityAssessor::new(config).assess(dungeon)
}
