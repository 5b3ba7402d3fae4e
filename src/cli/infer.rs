//! Infer command - print the document with inferred connectivity

use anyhow::{Context, Result};
use dungeon_assess::models::Dungeon;
use dungeon_assess::spatial::SpatialInference;
use std::path::Path;

/// Read and parse a dungeon document
pub(super) fn read_document(file: &Path) -> Result<Dungeon> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    Dungeon::from_json(&content).with_context(|| format!("Failed to parse {}", file.display()))
}

pub fn run(file: &Path, threshold: f64, output: Option<&Path>) -> Result<()> {
    let dungeon = read_document(file)?;
    let enhanced = SpatialInference::new(threshold).enhance(&dungeon);
    let json = enhanced.to_json_pretty()?;
    super::emit(&json, output)
}
