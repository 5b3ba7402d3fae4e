//! Quality rules
//!
//! Every metric the assessor reports is a [`Rule`]. Rules are registered at
//! compile time by [`default_rules`]; adding a metric means adding a module
//! here and one line to that list.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               QualityAssessor                │
//! │  - Optional spatial inference                │
//! │  - Runs every rule, isolating failures       │
//! │  - Weights scores into overall + grade       │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │                 Rule Trait                   │
//! │  - name(): key in the report                 │
//! │  - evaluate_level(level): score one level    │
//! │  - evaluate(dungeon): mean over levels       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Rules
//!
//! ## Structure
//! - `accessibility` - reach and spread of distances from the entrance
//! - `path_diversity` - variety of routes, by seeded random walks
//! - `key_path_length` - entrance-to-exit distance vs. level depth
//! - `loop_ratio` - independent cycles per node
//! - `degree_variance` - variety of connections per node
//! - `door_distribution` - doors per room
//! - `dead_end_ratio` - share of non-dead-end nodes
//!
//! ## Gameplay
//! - `treasure_distribution`, `monster_distribution` - density and spread
//!
//! ## Aesthetic
//! - `aesthetic_balance` - proximity, similarity, continuity, balance

mod accessibility;
mod aesthetic_balance;
mod base;
mod dead_end_ratio;
mod degree_variance;
mod door_distribution;
mod element_distribution;
mod key_path_length;
mod loop_ratio;
mod path_diversity;

pub use accessibility::AccessibilityRule;
pub use aesthetic_balance::AestheticBalanceRule;
pub use base::{aggregate_levels, finite_score, Rule, RuleCategory, RuleOutcome, RuleResult};
pub use dead_end_ratio::DeadEndRatioRule;
pub use degree_variance::DegreeVarianceRule;
pub use door_distribution::DoorDistributionRule;
pub use element_distribution::{MonsterDistributionRule, TreasureDistributionRule};
pub use key_path_length::KeyPathLengthRule;
pub use loop_ratio::LoopRatioRule;
pub use path_diversity::PathDiversityRule;

use crate::config::AssessConfig;
use std::sync::Arc;

/// The built-in rules in report order
pub fn default_rules(config: &AssessConfig) -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(AccessibilityRule),
        Arc::new(PathDiversityRule::new(config.path_diversity.clone())),
        Arc::new(KeyPathLengthRule),
        Arc::new(LoopRatioRule),
        Arc::new(DegreeVarianceRule),
        Arc::new(DoorDistributionRule),
        Arc::new(DeadEndRatioRule),
        Arc::new(TreasureDistributionRule),
        Arc::new(MonsterDistributionRule),
        Arc::new(AestheticBalanceRule),
    ]
}

/// Names of the built-in rules, in report order
pub fn rule_names() -> Vec<&'static str> {
    default_rules(&AssessConfig::default())
        .iter()
        .map(|r| r.name())
        .collect()
}
