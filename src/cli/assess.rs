//! Assess command - score a dungeon document

use anyhow::{Context, Result};
use dungeon_assess::config::AssessConfig;
use dungeon_assess::models::Dungeon;
use dungeon_assess::reporters;
use dungeon_assess::scoring::QualityAssessor;
use std::path::Path;
use tracing::{info, warn};

/// Read, parse and score `file`, then print or write the report
pub fn run(file: &Path, config: AssessConfig, format: &str, output: Option<&Path>) -> Result<()> {
    let dungeon = super::infer::read_document(file)?;
    for problem in dungeon.validate() {
        warn!("{}", problem);
    }

    info!(
        "Assessing {} ({} levels, inference {})",
        file.display(),
        dungeon.levels.len(),
        if config.enable_spatial_inference { "on" } else { "off" }
    );

    let report = QualityAssessor::new(config).assess(&dungeon);
    let rendered = reporters::report(&report, format)
        .with_context(|| format!("Failed to render {} report", format))?;
    super::emit(&rendered, output)
}
