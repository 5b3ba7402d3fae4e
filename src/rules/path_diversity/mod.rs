//! Path diversity rule
//!
//! Estimates how many genuinely different routes a level offers by sampling.
//! Each round picks node pairs stratified by eccentricity tier, runs biased
//! random walks between them and scores the walks that arrive (Jaccard
//! distance, length entropy, length variation). Rounds continue until the
//! running mean settles or the time budget runs out; the budget is checked
//! between rounds, so a timed-out result is built from fewer samples and says
//! so in its detail.
//!
//! If no walk succeeds at all, a structural estimate from component sizes,
//! degrees and sampled distances stands in.
//!
//! The generator is seeded from the configuration on every evaluation, so
//! the same document and seed always give the same score.

mod fallback;
mod metrics;
mod sampling;

use super::base::{aggregate_levels, Rule, RuleCategory, RuleOutcome};
use crate::config::PathDiversityConfig;
use crate::graph::LevelGraph;
use crate::models::{Dungeon, Level};
use crate::stats::{clamp01, mean};
use anyhow::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sampling::{PathSampler, Tiers};
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const MIN_WALK_LENGTH: usize = 4;
/// Walks give up after this many multiples of the diameter
const WALK_LENGTH_FACTOR: usize = 3;
const FALLBACK_DISTANCE_SAMPLES: usize = 50;

/// Wall-clock allowance shared by every level of one document
#[derive(Debug, Clone, Copy)]
struct Budget {
    started: Instant,
    limit: Duration,
}

impl Budget {
    fn new(timeout_secs: f64) -> Self {
        let limit = Duration::try_from_secs_f64(timeout_secs).unwrap_or_else(|_| {
            warn!("Invalid path diversity timeout {}, using 30s", timeout_secs);
            Duration::from_secs(30)
        });
        Self {
            started: Instant::now(),
            limit,
        }
    }

    fn exhausted(&self) -> bool {
        self.started.elapsed() >= self.limit
    }
}

pub struct PathDiversityRule {
    config: PathDiversityConfig,
}

impl Default for PathDiversityRule {
    fn default() -> Self {
        Self::new(PathDiversityConfig::default())
    }
}

impl PathDiversityRule {
    pub fn new(config: PathDiversityConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(PathDiversityConfig {
            seed,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &PathDiversityConfig {
        &self.config
    }

    fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.config.seed)
    }

    fn score_level(&self, level: &Level, rng: &mut ChaCha8Rng, budget: &Budget) -> RuleOutcome {
        let graph = LevelGraph::from_connections(level);
        if graph.node_count() < 2 {
            return RuleOutcome::missing("no rooms or connections");
        }

        let tiers = Tiers::classify(&graph);
        let max_walk_length = MIN_WALK_LENGTH.max(WALK_LENGTH_FACTOR * tiers.diameter);
        let sampler = PathSampler::new(
            &graph,
            self.config.walks_per_pair,
            max_walk_length,
            self.config.unvisited_bias,
        );

        let mut pair_scores: Vec<f64> = Vec::new();
        let mut rounds = 0usize;
        let mut pairs_sampled = 0usize;
        let mut walks_succeeded = 0usize;
        let mut converged = false;
        let mut timed_out = false;
        let mut previous_mean: Option<f64> = None;

        while rounds < self.config.max_rounds {
            let pairs = tiers.stratified_pairs(self.config.pairs_per_round, rng);
            for pair in &pairs {
                let paths = sampler.sample_paths(*pair, rng);
                walks_succeeded += paths.len();
                if !paths.is_empty() {
                    pair_scores.push(metrics::pair_metrics(&paths).diversity);
                }
            }
            rounds += 1;
            pairs_sampled += pairs.len();

            if !pair_scores.is_empty() {
                let current = mean(&pair_scores);
                if let Some(prev) = previous_mean {
                    if rounds >= self.config.min_rounds
                        && (current - prev).abs() < self.config.convergence_tolerance
                    {
                        converged = true;
                        break;
                    }
                }
                previous_mean = Some(current);
            }

            if rounds < self.config.max_rounds && budget.exhausted() {
                timed_out = true;
                warn!(
                    "Path diversity for level {} stopped after {} rounds: time budget exhausted",
                    level.id, rounds
                );
                break;
            }
        }

        debug!(
            "Level {}: path diversity sampled {} pairs over {} rounds ({} walks arrived)",
            level.id, pairs_sampled, rounds, walks_succeeded
        );

        let mut detail = json!({
            "rounds": rounds,
            "pairs_sampled": pairs_sampled,
            "pairs_scored": pair_scores.len(),
            "walks_attempted": pairs_sampled * self.config.walks_per_pair,
            "walks_succeeded": walks_succeeded,
            "converged": converged,
            "timed_out": timed_out,
            "diameter": tiers.diameter,
            "max_walk_length": max_walk_length,
            "tiers": {
                "center": tiers.center.len(),
                "medium": tiers.medium.len(),
                "periphery": tiers.periphery.len(),
            },
            "seed": self.config.seed,
        });
        if timed_out {
            detail["note"] = json!("reduced sample: sampling stopped at the time budget");
        }

        if pair_scores.is_empty() {
            let estimate =
                fallback::structural_diversity(&graph, FALLBACK_DISTANCE_SAMPLES, rng);
            detail["fallback_used"] = json!(true);
            detail["component_entropy"] = json!(estimate.component_entropy);
            detail["degree_entropy"] = json!(estimate.degree_entropy);
            detail["distance_cv"] = json!(estimate.distance_cv);
            return RuleOutcome::new(estimate.score, detail);
        }

        let avg = mean(&pair_scores);
        let min = pair_scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = pair_scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let score = if max - min > f64::EPSILON {
            (avg - min) / (max - min)
        } else {
            avg
        };

        detail["fallback_used"] = json!(false);
        detail["mean_diversity"] = json!(avg);
        detail["min_diversity"] = json!(min);
        detail["max_diversity"] = json!(max);
        RuleOutcome::new(clamp01(score), detail)
    }
}

impl Rule for PathDiversityRule {
    fn name(&self) -> &'static str {
        "path_diversity"
    }

    fn description(&self) -> &'static str {
        "Variety of routes between rooms, estimated by seeded random walks"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn evaluate_level(&self, level: &Level) -> Result<RuleOutcome> {
        let mut rng = self.rng();
        let budget = Budget::new(self.config.timeout_secs);
        Ok(self.score_level(level, &mut rng, &budget))
    }

    /// One generator and one time budget span every level of the document
    fn evaluate(&self, dungeon: &Dungeon) -> Result<RuleOutcome> {
        let mut rng = self.rng();
        let budget = Budget::new(self.config.timeout_secs);
        aggregate_levels(dungeon, |level| Ok(self.score_level(level, &mut rng, &budget)))
    }
}
