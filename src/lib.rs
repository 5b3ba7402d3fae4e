//! Dungeon Assess - graph-based quality assessment for generated dungeons
//!
//! Takes a unified dungeon document (levels of rooms, corridors, doors,
//! connections and game elements), optionally repairs missing connectivity
//! with spatial adjacency inference, and scores the resulting graph with a
//! set of independent rules that are combined into an overall score and a
//! letter grade.
//!
//! ```rust,ignore
//! use dungeon_assess::{config::AssessConfig, models::Dungeon, scoring::QualityAssessor};
//!
//! let dungeon = Dungeon::from_json(&std::fs::read_to_string("map.json")?)?;
//! let assessor = QualityAssessor::new(AssessConfig::default());
//! let report = assessor.assess(&dungeon);
//! println!("{} ({:.2})", report.grade, report.overall_score);
//! ```

pub mod config;
pub mod entrance;
pub mod graph;
pub mod models;
pub mod reporters;
pub mod rules;
pub mod scoring;
pub mod spatial;
pub mod stats;
