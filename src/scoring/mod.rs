//! Overall quality scoring
//!
//! # Scoring Formula
//!
//! ```text
//! Overall = Σ (weight_r × score_r) / Σ weight_r     over rules with weight_r > 0
//! ```
//!
//! Every rule score is clamped to [0, 1] first, so the overall score is too.
//! Weights come from [`AssessConfig::weights`](crate::config::AssessConfig);
//! a rule missing from the table has weight 0 and only appears in the report.
//!
//! # Grades
//!
//! | Overall | Grade |
//! |---------|-------|
//! | ≥ 0.8   | A     |
//! | ≥ 0.6   | B     |
//! | ≥ 0.4   | C     |
//! | ≥ 0.3   | D     |
//! | < 0.3   | F     |
//!
//! Rules scoring under 0.6 contribute a recommendation; a report without any
//! carries a single "no major issues" line.

mod assessor;
mod recommendations;

pub use assessor::{assess, QualityAssessor};
pub use recommendations::{advice_for, NO_ISSUES, RECOMMENDATION_THRESHOLD};
