//! Door distribution rule
//!
//! Counts doors per room. A door counts once for every room listed in its
//! `connects`; a door without `connects` counts for each room whose bounds
//! contain its position (within one unit). The mean is scored against an
//! ideal band of 1 to 3 doors per room, then scaled by the complexity factor.

use super::base::{Rule, RuleCategory, RuleOutcome};
use crate::models::{Bounds, Level, Room};
use crate::stats::{complexity_factor, mean};
use anyhow::Result;
use serde_json::json;
use std::collections::HashMap;

const DOOR_POSITION_TOLERANCE: f64 = 1.0;
const IDEAL_MIN_DOORS: f64 = 1.0;
const IDEAL_MAX_DOORS: f64 = 3.0;
/// Mean at which the score above the band reaches 0
const SATURATED_DOORS: f64 = 6.0;

pub struct DoorDistributionRule;

impl Rule for DoorDistributionRule {
    fn name(&self) -> &'static str {
        "door_distribution"
    }

    fn description(&self) -> &'static str {
        "Doors per room relative to an ideal band of one to three"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn evaluate_level(&self, level: &Level) -> Result<RuleOutcome> {
        if level.rooms.is_empty() {
            return Ok(RuleOutcome::missing("no rooms"));
        }

        let mut per_room: HashMap<&str, usize> =
            level.rooms.iter().map(|r| (r.id.as_str(), 0)).collect();

        for door in &level.doors {
            if door.connects.is_empty() {
                for room in &level.rooms {
                    if room_bounds(room).contains(door.position, DOOR_POSITION_TOLERANCE) {
                        *per_room.entry(room.id.as_str()).or_insert(0) += 1;
                    }
                }
                continue;
            }
            let mut seen: Vec<&str> = Vec::with_capacity(door.connects.len());
            for id in &door.connects {
                if seen.contains(&id.as_str()) {
                    continue;
                }
                seen.push(id.as_str());
                if let Some(count) = per_room.get_mut(id.as_str()) {
                    *count += 1;
                }
            }
        }

        let counts: Vec<f64> = level
            .rooms
            .iter()
            .map(|r| per_room.get(r.id.as_str()).copied().unwrap_or(0) as f64)
            .collect();
        let doors_per_room = mean(&counts);
        let band = band_score(doors_per_room);
        let complexity = complexity_factor(level.rooms.len());

        let mut detail = json!({
            "doors": level.doors.len(),
            "rooms": level.rooms.len(),
            "doors_per_room": doors_per_room,
            "rooms_without_doors": counts.iter().filter(|c| **c == 0.0).count(),
            "band_score": band,
            "complexity_factor": complexity,
        });
        if level.doors.is_empty() {
            detail["reason"] = json!("no doors");
        }

        Ok(RuleOutcome::new(band * complexity, detail))
    }
}

fn room_bounds(room: &Room) -> Bounds {
    Bounds::from_rect(room.position, room.size)
}

/// 1 inside the ideal band, proportional below it, linear falloff above it
fn band_score(doors_per_room: f64) -> f64 {
    if doors_per_room < IDEAL_MIN_DOORS {
        doors_per_room / IDEAL_MIN_DOORS
    } else if doors_per_room <= IDEAL_MAX_DOORS {
        1.0
    } else {
        (1.0 - (doors_per_room - IDEAL_MAX_DOORS) / (SATURATED_DOORS - IDEAL_MAX_DOORS)).max(0.0)
    }
}
