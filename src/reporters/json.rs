//! JSON reporter
//!
//! Outputs the full QualityReport as pretty-printed JSON.
//! Field names match the report record, so downstream tools can rely on them.

use crate::models::QualityReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &QualityReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
