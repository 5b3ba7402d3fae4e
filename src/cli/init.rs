//! Init command - write a default configuration file

use anyhow::{Context, Result};
use console::style;
use dungeon_assess::config::TOML_CONFIG_NAME;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# dungeon-assess configuration

# Infer connections and doors from room geometry before scoring
enable_spatial_inference = true

# Maximum gap between two nodes still treated as adjacent
adjacency_threshold = 1.0

# Rule weights for the overall score. Rules left out get weight 0.
[weights]
accessibility = 0.20
path_diversity = 0.15
key_path_length = 0.10
loop_ratio = 0.10
degree_variance = 0.05
door_distribution = 0.05
dead_end_ratio = 0.10
treasure_distribution = 0.05
monster_distribution = 0.05
aesthetic_balance = 0.15

[path_diversity]
seed = 42
timeout_secs = 30.0
walks_per_pair = 10
pairs_per_round = 24
min_rounds = 2
max_rounds = 8
convergence_tolerance = 0.005
unvisited_bias = 3.0
"#;

/// Run the init command
pub fn run(path: &Path, force: bool) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", path.display());
    }

    let config_path = path.join(TOML_CONFIG_NAME);
    if config_path.exists() && !force {
        println!(
            "{} {} already exists (use --force to overwrite)",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    Ok(())
}
