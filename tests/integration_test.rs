//! Integration tests for the assessment pipeline
//!
//! These tests drive the public library API end to end:
//! - Reports are complete and bounded
//! - Structural rules produce their documented values on known layouts
//! - Spatial inference only ever adds connectivity
//! - Seeded runs are reproducible

use dungeon_assess::config::AssessConfig;
use dungeon_assess::graph::LevelGraph;
use dungeon_assess::models::{Connection, Dungeon, Grade, Level, Room};
use dungeon_assess::rules::rule_names;
use dungeon_assess::scoring::{assess, QualityAssessor};
use dungeon_assess::spatial::SpatialInference;

const EPS: f64 = 1e-9;

/// Rooms spaced far apart so inference never links them
fn level(ids: &[&str], edges: &[(&str, &str)]) -> Level {
    let mut level = Level::new("L1");
    for (i, id) in ids.iter().enumerate() {
        level
            .rooms
            .push(Room::new(*id, i as f64 * 20.0, 0.0, 5.0, 5.0));
    }
    for (a, b) in edges {
        level.connections.push(Connection::new(*a, *b));
    }
    level
}

fn chain() -> Level {
    level(
        &["a", "b", "c", "d", "e"],
        &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")],
    )
}

fn ring() -> Level {
    level(
        &["a", "b", "c", "d"],
        &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")],
    )
}

fn declared_only() -> AssessConfig {
    AssessConfig::default().with_spatial_inference(false)
}

#[test]
fn test_report_covers_every_rule_with_bounded_scores() {
    let report = assess(&Dungeon::single_level(chain()), AssessConfig::default());

    for name in rule_names() {
        let score = report.scores[name];
        assert!((0.0..=1.0).contains(&score), "{} out of range: {}", name, score);
        assert!(report.details.contains_key(name), "missing detail for {}", name);
    }
    assert!((0.0..=1.0).contains(&report.overall_score));
    assert_eq!(report.grade, Grade::from_score(report.overall_score));
    assert!(report.spatial_inference_used);
}

#[test]
fn test_empty_document_scores_zero() {
    let report = assess(&Dungeon::default(), AssessConfig::default());
    assert_eq!(report.overall_score, 0.0);
    assert_eq!(report.grade, Grade::F);
    assert_eq!(report.details["accessibility"]["reason"], "no levels");
}

#[test]
fn test_linear_chain_structure() {
    let report = assess(&Dungeon::single_level(chain()), declared_only());

    assert!((report.scores["dead_end_ratio"] - 0.6).abs() < EPS);
    assert_eq!(report.details["loop_ratio"]["cycles"], 0);
    assert!((report.scores["loop_ratio"] - (-3.125_f64).exp()).abs() < EPS);
    assert!(!report.spatial_inference_used);
}

#[test]
fn test_four_room_corridor_dead_ends() {
    let l = level(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C"), ("C", "D")]);
    let report = assess(&Dungeon::single_level(l), declared_only());

    assert!((report.scores["dead_end_ratio"] - 0.5).abs() < EPS);
    assert_eq!(report.details["dead_end_ratio"]["dead_ends"], 2);
}

#[test]
fn test_ring_has_no_dead_ends() {
    let report = assess(&Dungeon::single_level(ring()), declared_only());

    assert!((report.scores["dead_end_ratio"] - 1.0).abs() < EPS);
    assert_eq!(report.details["loop_ratio"]["cycles"], 1);
    assert!((report.details["loop_ratio"]["loop_ratio"].as_f64().unwrap() - 0.25).abs() < EPS);
}

#[test]
fn test_flagged_entrance_and_exit_drive_key_path() {
    let mut l = chain();
    l.rooms[0] = l.rooms[0].clone().as_entrance();
    l.rooms[4] = l.rooms[4].clone().as_exit();

    let report = assess(&Dungeon::single_level(l), declared_only());
    let detail = &report.details["key_path_length"];
    assert_eq!(detail["entrance"], "a");
    assert_eq!(detail["exit"], "e");
    assert_eq!(detail["path_length"], 4);
    assert!((report.scores["key_path_length"] - (-1.0_f64).exp()).abs() < EPS);
}

#[test]
fn test_unconnected_rooms() {
    let l = level(&["a", "b", "c", "d"], &[]);
    let report = assess(&Dungeon::single_level(l), declared_only());

    for name in [
        "accessibility",
        "path_diversity",
        "key_path_length",
        "loop_ratio",
        "door_distribution",
        "dead_end_ratio",
        "treasure_distribution",
        "monster_distribution",
    ] {
        assert_eq!(report.scores[name], 0.0, "{}", name);
    }
    // Four isolated nodes: variance 0, complexity 0.5 + 0.5 * 4/10
    let degree_variance = (-0.5_f64).exp() * 0.7;
    assert!((report.scores["degree_variance"] - degree_variance).abs() < EPS);

    // Equal 5x5 rooms 15 apart, centred on their own extent:
    // proximity exp(-15/5), similarity 1, continuity 0, balance 1
    let aesthetic = 0.25 * (-3.0_f64).exp() + 0.25 + 0.3;
    assert!((report.scores["aesthetic_balance"] - aesthetic).abs() < EPS);

    let weights = AssessConfig::default();
    let total: f64 = rule_names().iter().map(|n| weights.weight(n)).sum();
    let overall = (weights.weight("degree_variance") * degree_variance
        + weights.weight("aesthetic_balance") * aesthetic)
        / total;
    assert!((report.overall_score - overall).abs() < EPS);
}

#[test]
fn test_unconnected_rooms_score_zero_on_structural_weights() {
    let l = level(&["a", "b", "c", "d"], &[]);
    let config = declared_only()
        .with_weight("degree_variance", 0.0)
        .with_weight("aesthetic_balance", 0.0);
    let report = assess(&Dungeon::single_level(l), config);
    assert_eq!(report.overall_score, 0.0);
    assert_eq!(report.grade, Grade::F);
}

#[test]
fn test_multi_level_scores_are_averaged() {
    let mut second = ring();
    second.id = "L2".to_string();
    let dungeon = Dungeon {
        levels: vec![chain(), second],
        ..Dungeon::default()
    };

    let report = assess(&dungeon, declared_only());
    assert!((report.scores["dead_end_ratio"] - 0.8).abs() < EPS);
    let detail = &report.details["dead_end_ratio"];
    assert_eq!(detail["levels_evaluated"], 2);
    assert_eq!(detail["levels"][1]["level"], "L2");
}

#[test]
fn test_inference_only_adds_connections() {
    let mut l = Level::new("L1");
    l.rooms.push(Room::new("a", 0.0, 0.0, 10.0, 10.0));
    l.rooms.push(Room::new("b", 10.0, 0.0, 10.0, 10.0));
    l.rooms.push(Room::new("c", 20.0, 0.0, 10.0, 10.0));
    l.rooms.push(Room::new("far", 100.0, 100.0, 5.0, 5.0));
    l.connections.push(Connection::new("a", "far"));

    let before = LevelGraph::from_connections(&l).edge_count();
    let enhanced = SpatialInference::default().enhance_level(&l);
    let after = LevelGraph::from_connections(&enhanced).edge_count();

    assert!(after >= before);
    assert!(enhanced.is_connected("a", "far"));
    assert!(enhanced.is_connected("a", "b"));
    assert!(enhanced.is_connected("b", "c"));
    assert!(!enhanced.is_connected("a", "c"));
}

#[test]
fn test_inference_does_not_mutate_input() {
    let mut l = Level::new("L1");
    l.rooms.push(Room::new("a", 0.0, 0.0, 10.0, 10.0));
    l.rooms.push(Room::new("b", 10.0, 0.0, 10.0, 10.0));
    let dungeon = Dungeon::single_level(l);
    let snapshot = dungeon.clone();

    let report = assess(&dungeon, AssessConfig::default());
    assert_eq!(dungeon, snapshot);
    assert!(report.scores["accessibility"] > 0.0);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let mut l = ring();
    l.rooms.push(Room::new("e", 200.0, 0.0, 5.0, 5.0));
    l.connections.push(Connection::new("c", "e"));
    l.connections.push(Connection::new("a", "c"));
    let dungeon = Dungeon::single_level(l);

    let assessor = QualityAssessor::new(declared_only());
    let first = assessor.assess(&dungeon);
    let second = assessor.assess(&dungeon);
    assert_eq!(first, second);
    assert_eq!(first.details["path_diversity"]["seed"], 42);
}

#[test]
fn test_zero_weight_rule_still_reported() {
    let config = declared_only().with_weight("aesthetic_balance", 0.0);
    let report = assess(&Dungeon::single_level(ring()), config);
    assert!(report.scores.contains_key("aesthetic_balance"));
}

#[test]
fn test_grade_boundaries() {
    assert_eq!(Grade::from_score(0.8), Grade::A);
    assert_eq!(Grade::from_score(0.7999), Grade::B);
    assert_eq!(Grade::from_score(0.6), Grade::B);
    assert_eq!(Grade::from_score(0.4), Grade::C);
    assert_eq!(Grade::from_score(0.3), Grade::D);
    assert_eq!(Grade::from_score(0.2999), Grade::F);
}
