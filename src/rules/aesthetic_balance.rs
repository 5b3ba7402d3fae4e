//! Aesthetic balance rule
//!
//! Four layout components, weighted 0.25 / 0.25 / 0.2 / 0.3:
//!
//! - proximity: rooms sit close to their nearest neighbour, relative to
//!   the mean room dimension
//! - similarity: room areas have a low coefficient of variation
//! - continuity: connections join rooms that share a row or column band,
//!   so a straight corridor could link them
//! - balance: the area-weighted centroid sits near the centre of the map

use super::base::{Rule, RuleCategory, RuleOutcome};
use crate::models::{Bounds, Level, Point};
use crate::stats::{clamp01, coefficient_of_variation, mean, variance};
use anyhow::Result;
use serde_json::json;

const PROXIMITY_WEIGHT: f64 = 0.25;
const SIMILARITY_WEIGHT: f64 = 0.25;
const CONTINUITY_WEIGHT: f64 = 0.2;
const BALANCE_WEIGHT: f64 = 0.3;

pub struct AestheticBalanceRule;

impl Rule for AestheticBalanceRule {
    fn name(&self) -> &'static str {
        "aesthetic_balance"
    }

    fn description(&self) -> &'static str {
        "Proximity, size similarity, alignment and visual balance of rooms"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Aesthetic
    }

    fn evaluate_level(&self, level: &Level) -> Result<RuleOutcome> {
        if level.rooms.is_empty() {
            return Ok(RuleOutcome::missing("no rooms"));
        }
        let bounds: Vec<Bounds> = level
            .rooms
            .iter()
            .map(|r| Bounds::from_rect(r.position, r.size))
            .collect();
        let areas: Vec<f64> = bounds.iter().map(Bounds::area).collect();

        let proximity = proximity(&bounds);
        let similarity = clamp01(1.0 - coefficient_of_variation(&areas).min(1.0));
        let continuity = continuity(level);
        let balance = balance(&bounds, &level.map_extent());

        let score = PROXIMITY_WEIGHT * proximity
            + SIMILARITY_WEIGHT * similarity
            + CONTINUITY_WEIGHT * continuity
            + BALANCE_WEIGHT * balance;

        Ok(RuleOutcome::new(
            score,
            json!({
                "proximity": proximity,
                "similarity": similarity,
                "continuity": continuity,
                "balance": balance,
                "room_size_variance": variance(&areas),
                "mean_room_area": mean(&areas),
            }),
        ))
    }
}

/// `exp(-mean_gap / mean_dimension)`, gaps measured edge to edge to each
/// room's nearest neighbour
fn proximity(bounds: &[Bounds]) -> f64 {
    if bounds.len() < 2 {
        return 1.0;
    }
    let mean_dim = mean(
        &bounds
            .iter()
            .map(|b| (b.width() + b.height()) / 2.0)
            .collect::<Vec<_>>(),
    );
    if mean_dim <= 0.0 {
        return 0.0;
    }

    let gaps: Vec<f64> = bounds
        .iter()
        .enumerate()
        .map(|(i, b)| {
            bounds
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, o)| b.gap(o))
                .fold(f64::INFINITY, f64::min)
        })
        .collect();

    (-mean(&gaps) / mean_dim).exp()
}

/// Fraction of connections whose endpoints overlap on the x or y axis
fn continuity(level: &Level) -> f64 {
    let mut total = 0usize;
    let mut aligned = 0usize;
    for conn in &level.connections {
        let (Some(a), Some(b)) = (level.node(&conn.from_room), level.node(&conn.to_room)) else {
            continue;
        };
        total += 1;
        let (a, b) = (a.bounds(), b.bounds());
        if a.overlap_x(&b) > 0.0 || a.overlap_y(&b) > 0.0 {
            aligned += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    aligned as f64 / total as f64
}

/// `1 - distance(area-weighted centroid, map centre) / half diagonal`
fn balance(bounds: &[Bounds], extent: &Bounds) -> f64 {
    let half_diagonal = extent.diagonal() / 2.0;
    if half_diagonal <= 0.0 {
        return 1.0;
    }
    let total_area: f64 = bounds.iter().map(Bounds::area).sum();
    let centroid = if total_area > 0.0 {
        let (sx, sy) = bounds.iter().fold((0.0, 0.0), |(sx, sy), b| {
            let c = b.center();
            (sx + c.x * b.area(), sy + c.y * b.area())
        });
        Point::new(sx / total_area, sy / total_area)
    } else {
        let centers: Vec<Point> = bounds.iter().map(Bounds::center).collect();
        Point::new(
            mean(&centers.iter().map(|c| c.x).collect::<Vec<_>>()),
            mean(&centers.iter().map(|c| c.y).collect::<Vec<_>>()),
        )
    };
    clamp01(1.0 - centroid.distance(&extent.center()) / half_diagonal)
}
