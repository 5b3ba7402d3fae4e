//! Spatial adjacency inference
//!
//! Some generators emit room geometry without connectivity, or with only part
//! of it. This module recovers plausible connections from geometry alone:
//! two nodes are adjacent when their bounds share a span on one axis and the
//! gap on the other axis is within the adjacency threshold (edge contact, never
//! corner contact).
//!
//! # Confidence
//!
//! ```text
//! confidence = 0.5 + 0.5 × min(1, contact_area / smaller_node_area)
//! ```
//!
//! `contact_area` is the intersection of both bounds after inflating each by
//! half the threshold, so a pair separated by exactly the threshold has zero
//! contact and stays at the base confidence, which the merge step rejects.
//!
//! Inference is additive: existing connections and doors are never touched,
//! and pairs that are already connected are skipped.

use crate::models::{Bounds, Connection, Door, Dungeon, Level, Point};
use tracing::{debug, info};

/// Confidence every adjacent pair starts from
pub const BASE_CONFIDENCE: f64 = 0.5;

/// Inferred edges must score strictly above this to be merged
pub const CONFIDENCE_FLOOR: f64 = 0.5;

pub const DEFAULT_ADJACENCY_THRESHOLD: f64 = 1.0;

/// Geometric relation between two adjacent nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjacency {
    pub confidence: f64,
    pub door_position: Point,
}

/// Edges and doors proposed for one level
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inference {
    pub connections: Vec<Connection>,
    pub doors: Vec<Door>,
}

/// Test two bounds for edge adjacency within `threshold`
pub fn adjacency(a: &Bounds, b: &Bounds, threshold: f64) -> Option<Adjacency> {
    let threshold = threshold.max(0.0);
    let overlap_x = a.overlap_x(b);
    let overlap_y = a.overlap_y(b);

    let stacked = overlap_x > 0.0 && -overlap_y <= threshold;
    let side_by_side = overlap_y > 0.0 && -overlap_x <= threshold;
    if !stacked && !side_by_side {
        return None;
    }

    let half = threshold / 2.0;
    let contact = a.inflate(half).intersection_area(&b.inflate(half));
    let smaller = a.area().min(b.area());
    let ratio = if smaller > 0.0 { contact / smaller } else { 0.0 };
    let confidence = BASE_CONFIDENCE + 0.5 * ratio.min(1.0);

    Some(Adjacency {
        confidence,
        door_position: door_position(a, b),
    })
}

/// Midpoint of the shared span on the touching edge.
///
/// On the overlapping axis this is the middle of the overlap; on the other
/// axis it is the middle of the gap (or seam) between the facing edges.
fn door_position(a: &Bounds, b: &Bounds) -> Point {
    if a.is_degenerate() || b.is_degenerate() {
        let (ca, cb) = (a.center(), b.center());
        return Point::new((ca.x + cb.x) / 2.0, (ca.y + cb.y) / 2.0);
    }
    Point::new(
        (a.min_x.max(b.min_x) + a.max_x.min(b.max_x)) / 2.0,
        (a.min_y.max(b.min_y) + a.max_y.min(b.max_y)) / 2.0,
    )
}

/// Adjacency inference over whole levels and documents
#[derive(Debug, Clone, Copy)]
pub struct SpatialInference {
    threshold: f64,
    confidence_floor: f64,
}

impl Default for SpatialInference {
    fn default() -> Self {
        Self::new(DEFAULT_ADJACENCY_THRESHOLD)
    }
}

impl SpatialInference {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            confidence_floor: CONFIDENCE_FLOOR,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Propose connections for every unconnected adjacent pair in `level`.
    ///
    /// Doors are only proposed when the level has none of its own. O(n²) in
    /// the node count.
    pub fn infer(&self, level: &Level) -> Inference {
        let nodes: Vec<(&str, Bounds)> = level.nodes().map(|n| (n.id(), n.bounds())).collect();
        let make_doors = level.doors.is_empty();
        let mut inference = Inference::default();

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let (a_id, a_bounds) = nodes[i];
                let (b_id, b_bounds) = nodes[j];
                if a_id == b_id || level.is_connected(a_id, b_id) {
                    continue;
                }
                let Some(adj) = adjacency(&a_bounds, &b_bounds, self.threshold) else {
                    continue;
                };

                let mut connection = Connection::new(a_id, b_id);
                connection.inferred = true;
                connection.confidence = Some(adj.confidence);

                if make_doors {
                    let door_id = format!("inferred_door_{}", inference.doors.len() + 1);
                    inference.doors.push(Door {
                        id: door_id.clone(),
                        position: adj.door_position,
                        connects: vec![a_id.to_string(), b_id.to_string()],
                        inferred: true,
                    });
                    connection.door_id = Some(door_id);
                }
                inference.connections.push(connection);
            }
        }

        debug!(
            "Level {}: {} adjacency candidates",
            level.id,
            inference.connections.len()
        );
        inference
    }

    /// Return a copy of `level` with confident inferred edges merged in
    pub fn enhance_level(&self, level: &Level) -> Level {
        let inference = self.infer(level);
        let mut enhanced = level.clone();

        let kept: Vec<Connection> = inference
            .connections
            .into_iter()
            .filter(|c| c.confidence.unwrap_or(0.0) > self.confidence_floor)
            .collect();
        let kept_doors: Vec<Door> = inference
            .doors
            .into_iter()
            .filter(|d| kept.iter().any(|c| c.door_id.as_deref() == Some(d.id.as_str())))
            .collect();

        if !kept.is_empty() {
            enhanced.connections_inferred = true;
            enhanced.connections.extend(kept);
        }
        if !kept_doors.is_empty() {
            enhanced.doors_inferred = true;
            enhanced.doors.extend(kept_doors);
        }
        enhanced
    }

    /// Return an enriched copy of the document; the input is left untouched
    pub fn enhance(&self, dungeon: &Dungeon) -> Dungeon {
        let levels: Vec<Level> = dungeon
            .levels
            .iter()
            .map(|level| self.enhance_level(level))
            .collect();

        let added: usize = levels
            .iter()
            .zip(&dungeon.levels)
            .map(|(new, old)| new.connections.len() - old.connections.len())
            .sum();
        info!(
            "Spatial inference added {} connections across {} levels",
            added,
            levels.len()
        );

        Dungeon {
            header: dungeon.header.clone(),
            levels,
        }
    }
}

/// Convenience wrapper: enhance `dungeon` with the given adjacency threshold
pub fn enhance(dungeon: &Dungeon, threshold: f64) -> Dungeon {
    SpatialInference::new(threshold).enhance(dungeon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Corridor, Room};

    fn bounds(x: f64, y: f64, w: f64, h: f64) -> Bounds {
        Bounds::from_rect(Point::new(x, y), crate::models::Size::new(w, h))
    }

    #[test]
    fn test_side_by_side_rooms_are_adjacent() {
        let a = bounds(0.0, 0.0, 10.0, 10.0);
        let b = bounds(10.0, 0.0, 10.0, 10.0);
        let adj = adjacency(&a, &b, 1.0).expect("adjacent");
        // Contact strip is 1 x 11 after inflating by 0.5
        assert!((adj.confidence - (0.5 + 0.5 * 0.11)).abs() < 1e-9);
        assert_eq!(adj.door_position, Point::new(10.0, 5.0));
    }

    #[test]
    fn test_diagonal_contact_is_not_adjacent() {
        let a = bounds(0.0, 0.0, 10.0, 10.0);
        let b = bounds(10.5, 10.5, 10.0, 10.0);
        assert!(adjacency(&a, &b, 1.0).is_none());
    }

    #[test]
    fn test_gap_beyond_threshold_is_not_adjacent() {
        let a = bounds(0.0, 0.0, 10.0, 10.0);
        let b = bounds(0.0, 12.0, 10.0, 10.0);
        assert!(adjacency(&a, &b, 1.0).is_none());
    }

    #[test]
    fn test_door_sits_in_gap_between_stacked_rooms() {
        let a = bounds(0.0, 0.0, 6.0, 4.0);
        let b = bounds(2.0, 5.0, 10.0, 4.0);
        let adj = adjacency(&a, &b, 1.0).expect("adjacent");
        assert_eq!(adj.door_position, Point::new(4.0, 4.5));
    }

    fn two_touching_rooms() -> Level {
        let mut level = Level::new("L1");
        level.rooms.push(Room::new("a", 0.0, 0.0, 10.0, 10.0));
        level.rooms.push(Room::new("b", 10.0, 0.0, 10.0, 10.0));
        level.rooms.push(Room::new("far", 50.0, 50.0, 5.0, 5.0));
        level
    }

    #[test]
    fn test_enhance_adds_edge_door_and_flags() {
        let dungeon = Dungeon::single_level(two_touching_rooms());
        let enhanced = enhance(&dungeon, 1.0);
        let level = &enhanced.levels[0];
        assert_eq!(level.connections.len(), 1);
        assert!(level.connections[0].inferred);
        assert!(level.connections_inferred);
        assert!(level.doors_inferred);
        assert_eq!(level.doors.len(), 1);
        assert_eq!(level.doors[0].connects, vec!["a", "b"]);
        // Original untouched
        assert!(dungeon.levels[0].connections.is_empty());
    }

    #[test]
    fn test_existing_doors_suppress_door_inference() {
        let mut level = two_touching_rooms();
        level.doors.push(Door {
            id: "d1".into(),
            position: Point::new(60.0, 60.0),
            ..Default::default()
        });
        let enhanced = SpatialInference::default().enhance_level(&level);
        assert_eq!(enhanced.connections.len(), 1);
        assert_eq!(enhanced.doors.len(), 1);
        assert!(!enhanced.doors_inferred);
        assert!(enhanced.connections[0].door_id.is_none());
    }

    #[test]
    fn test_already_connected_pairs_are_skipped() {
        let mut level = two_touching_rooms();
        level.connections.push(Connection::new("b", "a"));
        let enhanced = SpatialInference::default().enhance_level(&level);
        assert_eq!(enhanced.connections.len(), 1);
        assert!(!enhanced.connections_inferred);
    }

    #[test]
    fn test_enhance_is_idempotent() {
        let dungeon = Dungeon::single_level(two_touching_rooms());
        let once = enhance(&dungeon, 1.0);
        let twice = enhance(&once, 1.0);
        assert_eq!(once.levels[0].connections, twice.levels[0].connections);
    }

    #[test]
    fn test_corridor_path_bounds_join_rooms() {
        let mut level = Level::new("L1");
        level.rooms.push(Room::new("west", 0.0, 0.0, 6.0, 6.0));
        level.rooms.push(Room::new("east", 14.0, 0.0, 6.0, 6.0));
        level.corridors.push(Corridor::along(
            "hall",
            vec![Point::new(6.5, 3.0), Point::new(13.5, 3.0)],
        ));
        let enhanced = SpatialInference::default().enhance_level(&level);
        assert!(enhanced.is_connected("west", "hall"));
        assert!(enhanced.is_connected("hall", "east"));
        assert!(!enhanced.is_connected("west", "east"));
    }
}
