//! CLI command definitions and handlers

mod assess;
mod infer;
mod init;
mod rules;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dungeon_assess::config::{load_assess_config, load_config_file, AssessConfig};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Parse a finite, non-negative float
fn parse_non_negative(s: &str) -> Result<f64, String> {
    let v: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !v.is_finite() || v < 0.0 {
        Err("value must be a finite number >= 0".to_string())
    } else {
        Ok(v)
    }
}

/// dungeon-assess - Graph-based quality assessment for generated dungeons
#[derive(Parser, Debug)]
#[command(name = "dungeon-assess")]
#[command(
    version,
    about = "Score generated dungeon maps on connectivity, path variety, placement and layout",
    long_about = "dungeon-assess reads a unified dungeon JSON document, optionally infers \
missing connections from room geometry, and scores it with ten independent rules \
into an overall score and letter grade.",
    after_help = "\
Examples:
  dungeon-assess assess dungeon.json                 Text report
  dungeon-assess assess dungeon.json --format json   JSON report for scripting
  dungeon-assess assess dungeon.json --no-inference  Score declared connections only
  dungeon-assess infer dungeon.json                  Print the document with inferred edges
  dungeon-assess rules                               List rules and weights"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Config file (.toml or .json); default: dungeon-assess.toml or
    /// .dungeon-assess.json next to the input
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a dungeon document
    Assess {
        /// Dungeon JSON document
        file: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Skip spatial inference and score declared connections only
        #[arg(long)]
        no_inference: bool,

        /// Maximum gap between nodes still treated as adjacent
        #[arg(long, value_parser = parse_non_negative)]
        adjacency_threshold: Option<f64>,

        /// Seed for path diversity sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Path diversity time budget in seconds
        #[arg(long, value_parser = parse_non_negative)]
        timeout: Option<f64>,
    },

    /// Print the document with inferred connections and doors merged in
    Infer {
        /// Dungeon JSON document
        file: PathBuf,

        /// Maximum gap between nodes still treated as adjacent
        #[arg(long, value_parser = parse_non_negative)]
        adjacency_threshold: Option<f64>,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List the registered rules with their weights
    Rules,

    /// Write a dungeon-assess.toml with the default settings
    Init {
        /// Directory to write into
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Assess {
            file,
            format,
            output,
            no_inference,
            adjacency_threshold,
            seed,
            timeout,
        } => {
            let mut config = resolve_config(cli.config.as_deref(), &file);
            if no_inference {
                config.enable_spatial_inference = false;
            }
            if let Some(t) = adjacency_threshold {
                config.adjacency_threshold = t;
            }
            if let Some(s) = seed {
                config.path_diversity.seed = s;
            }
            if let Some(t) = timeout {
                config.path_diversity.timeout_secs = t;
            }
            assess::run(&file, config, &format, output.as_deref())
        }

        Commands::Infer {
            file,
            adjacency_threshold,
            output,
        } => {
            let config = resolve_config(cli.config.as_deref(), &file);
            let threshold = adjacency_threshold.unwrap_or(config.adjacency_threshold);
            infer::run(&file, threshold, output.as_deref())
        }

        Commands::Rules => {
            let config = match cli.config.as_deref() {
                Some(path) => explicit_config(path),
                None => load_assess_config(Path::new(".")),
            };
            rules::run(&config)
        }

        Commands::Init { path, force } => init::run(&path, force),
    }
}

/// Explicit `--config` wins; otherwise look next to the input document
fn resolve_config(explicit: Option<&Path>, input: &Path) -> AssessConfig {
    match explicit {
        Some(path) => explicit_config(path),
        None => {
            let dir = input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            load_assess_config(dir)
        }
    }
}

fn explicit_config(path: &Path) -> AssessConfig {
    load_config_file(path).unwrap_or_else(|e| {
        warn!("{}; using default configuration", e);
        AssessConfig::default()
    })
}

/// Write to a file, or to stdout when no path is given
fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
            eprintln!("Report written to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
