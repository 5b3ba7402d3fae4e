//! Treasure and monster distribution rules
//!
//! Both rules share one rubric over the positions of their element kinds:
//!
//! | Check                                        | Adjustment                  |
//! |----------------------------------------------|-----------------------------|
//! | start                                        | 0.5                         |
//! | elements per room inside the density band    | +0.2                        |
//! | outside the band                             | proportional, down to -0.2  |
//! | spread (std of positions / half diagonal)    | ≥ 0.3: +0.2, < 0.1: -0.1    |
//! | mean pairwise distance ≥ 0.25 × diagonal     | +0.1                        |
//! | each pair closer than one unit               | -0.05, at most -0.2         |
//!
//! The result is clamped to [0, 1]. A level without matching elements scores 0.

use super::base::{Rule, RuleCategory, RuleOutcome};
use crate::models::{ElementKind, Level, Point};
use crate::stats::{clamp01, mean, variance};
use anyhow::Result;
use serde_json::json;

const BASE_SCORE: f64 = 0.5;
const DENSITY_BONUS: f64 = 0.2;
const GOOD_SPREAD: f64 = 0.3;
const POOR_SPREAD: f64 = 0.1;
const SPREAD_BONUS: f64 = 0.2;
const SPREAD_PENALTY: f64 = 0.1;
const SEPARATION_FRACTION: f64 = 0.25;
const SEPARATION_BONUS: f64 = 0.1;
const OVERLAP_DISTANCE: f64 = 1.0;
const OVERLAP_PENALTY: f64 = 0.05;
const MAX_OVERLAP_PENALTY: f64 = 0.2;

/// Placement rubric for one family of game elements
struct Rubric {
    kinds: &'static [ElementKind],
    label: &'static str,
    /// Ideal elements per room, inclusive
    density_band: (f64, f64),
}

const TREASURE: Rubric = Rubric {
    kinds: &[ElementKind::Treasure],
    label: "treasure",
    density_band: (0.2, 1.0),
};

const MONSTERS: Rubric = Rubric {
    kinds: &[ElementKind::Monster, ElementKind::Boss],
    label: "monster",
    density_band: (0.3, 1.5),
};

impl Rubric {
    fn score(&self, level: &Level) -> RuleOutcome {
        if level.rooms.is_empty() {
            return RuleOutcome::missing("no rooms");
        }
        let positions: Vec<Point> = level.elements_of(self.kinds).map(|e| e.position).collect();
        if positions.is_empty() {
            return RuleOutcome::missing(format!("no {} elements", self.label));
        }

        let density = positions.len() as f64 / level.rooms.len() as f64;
        let density_adjustment = self.density_adjustment(density);

        let extent = level.map_extent();
        let diagonal = extent.diagonal();
        let spread = if diagonal > 0.0 {
            let xs: Vec<f64> = positions.iter().map(|p| p.x).collect();
            let ys: Vec<f64> = positions.iter().map(|p| p.y).collect();
            (variance(&xs) + variance(&ys)).sqrt() / (diagonal / 2.0)
        } else {
            0.0
        };
        let spread_adjustment = if spread >= GOOD_SPREAD {
            SPREAD_BONUS
        } else if spread < POOR_SPREAD {
            -SPREAD_PENALTY
        } else {
            0.0
        };

        let mut pair_distances = Vec::new();
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                pair_distances.push(a.distance(b));
            }
        }
        let mean_pair_distance = mean(&pair_distances);
        let separation_adjustment =
            if !pair_distances.is_empty() && mean_pair_distance >= SEPARATION_FRACTION * diagonal {
                SEPARATION_BONUS
            } else {
                0.0
            };
        let overlapping = pair_distances
            .iter()
            .filter(|d| **d < OVERLAP_DISTANCE)
            .count();
        let overlap_adjustment = -(OVERLAP_PENALTY * overlapping as f64).min(MAX_OVERLAP_PENALTY);

        let score = clamp01(
            BASE_SCORE
                + density_adjustment
                + spread_adjustment
                + separation_adjustment
                + overlap_adjustment,
        );

        RuleOutcome::new(
            score,
            json!({
                "count": positions.len(),
                "density": density,
                "density_band": [self.density_band.0, self.density_band.1],
                "spread": spread,
                "mean_pair_distance": mean_pair_distance,
                "overlapping_pairs": overlapping,
                "adjustments": {
                    "density": density_adjustment,
                    "spread": spread_adjustment,
                    "separation": separation_adjustment,
                    "overlap": overlap_adjustment,
                },
            }),
        )
    }

    fn density_adjustment(&self, density: f64) -> f64 {
        let (lo, hi) = self.density_band;
        if density < lo {
            -DENSITY_BONUS * (1.0 - density / lo)
        } else if density > hi {
            -DENSITY_BONUS * ((density - hi) / hi).min(1.0)
        } else {
            DENSITY_BONUS
        }
    }
}

pub struct TreasureDistributionRule;

impl Rule for TreasureDistributionRule {
    fn name(&self) -> &'static str {
        "treasure_distribution"
    }

    fn description(&self) -> &'static str {
        "Amount and spread of treasure across the level"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Gameplay
    }

    fn evaluate_level(&self, level: &Level) -> Result<RuleOutcome> {
        Ok(TREASURE.score(level))
    }
}

pub struct MonsterDistributionRule;

impl Rule for MonsterDistributionRule {
    fn name(&self) -> &'static str {
        "monster_distribution"
    }

    fn description(&self) -> &'static str {
        "Amount and spread of monsters and bosses across the level"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Gameplay
    }

    fn evaluate_level(&self, level: &Level) -> Result<RuleOutcome> {
        Ok(MONSTERS.score(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameElement, Room, Size};

    /// Four 10x10 rooms in a 2x2 grid on a 20x20 map
    fn grid_level() -> Level {
        let mut level = Level::new("L1");
        level.map_size = Some(Size::new(20.0, 20.0));
        level.rooms.push(Room::new("nw", 0.0, 0.0, 10.0, 10.0));
        level.rooms.push(Room::new("ne", 10.0, 0.0, 10.0, 10.0));
        level.rooms.push(Room::new("sw", 0.0, 10.0, 10.0, 10.0));
        level.rooms.push(Room::new("se", 10.0, 10.0, 10.0, 10.0));
        level
    }

    #[test]
    fn test_well_spread_treasure_scores_high() {
        let mut level = grid_level();
        level.game_elements.push(GameElement::new("t1", ElementKind::Treasure, 2.0, 2.0));
        level.game_elements.push(GameElement::new("t2", ElementKind::Treasure, 18.0, 18.0));
        let outcome = TreasureDistributionRule.evaluate_level(&level).unwrap();
        // density 0.5 in band, wide spread, far apart
        assert!((outcome.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_clustered_monsters_are_penalized() {
        let mut level = grid_level();
        for i in 0..3 {
            level.game_elements.push(GameElement::new(
                format!("m{i}"),
                ElementKind::Monster,
                5.0 + i as f64 * 0.1,
                5.0,
            ));
        }
        let outcome = MonsterDistributionRule.evaluate_level(&level).unwrap();
        // 0.5 + 0.2 (density 0.75) - 0.1 (spread) - 0.15 (three overlapping pairs)
        assert!((outcome.score - 0.45).abs() < 1e-9);
        assert_eq!(outcome.detail["overlapping_pairs"], 3);
    }

    #[test]
    fn test_boss_counts_as_monster_but_not_treasure() {
        let mut level = grid_level();
        level.game_elements.push(GameElement::new("b", ElementKind::Boss, 15.0, 15.0));
        assert!(MonsterDistributionRule.evaluate_level(&level).unwrap().score > 0.0);
        let treasure = TreasureDistributionRule.evaluate_level(&level).unwrap();
        assert_eq!(treasure.score, 0.0);
        assert_eq!(treasure.reason(), Some("no treasure elements"));
    }

    #[test]
    fn test_density_adjustment_is_proportional() {
        assert!((TREASURE.density_adjustment(0.1) + 0.1).abs() < 1e-9);
        assert!((TREASURE.density_adjustment(0.5) - 0.2).abs() < 1e-9);
        assert!((TREASURE.density_adjustment(1.5) + 0.1).abs() < 1e-9);
        assert!((TREASURE.density_adjustment(10.0) + 0.2).abs() < 1e-9);
    }
}
