//! Assessment configuration
//!
//! Loads settings from `dungeon-assess.toml` or `.dungeon-assess.json` in a
//! directory, or from an explicit file whose format follows its extension.
//!
//! # Configuration Format
//!
//! ```toml
//! # dungeon-assess.toml
//! enable_spatial_inference = true
//! adjacency_threshold = 1.0
//!
//! [weights]
//! accessibility = 0.2
//! path_diversity = 0.15
//! aesthetic_balance = 0.15
//!
//! [path_diversity]
//! seed = 42
//! timeout_secs = 30.0
//! walks_per_pair = 10
//! ```
//!
//! A `[weights]` table replaces the default table entirely: rules it does not
//! name get weight 0 and drop out of the overall score.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const TOML_CONFIG_NAME: &str = "dungeon-assess.toml";
pub const JSON_CONFIG_NAME: &str = ".dungeon-assess.json";

/// Default weight of every built-in rule; sums to 1.0
pub const DEFAULT_RULE_WEIGHTS: &[(&str, f64)] = &[
    ("accessibility", 0.20),
    ("path_diversity", 0.15),
    ("key_path_length", 0.10),
    ("loop_ratio", 0.10),
    ("degree_variance", 0.05),
    ("door_distribution", 0.05),
    ("dead_end_ratio", 0.10),
    ("treasure_distribution", 0.05),
    ("monster_distribution", 0.05),
    ("aesthetic_balance", 0.15),
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported config format for {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),
}

/// Top-level assessment settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AssessConfig {
    /// Rule weights for the overall score, keyed by rule name
    #[serde(default = "default_weights")]
    pub weights: BTreeMap<String, f64>,

    /// Run spatial inference before scoring (default: true)
    #[serde(default = "default_true")]
    pub enable_spatial_inference: bool,

    /// Maximum gap between two nodes still treated as adjacent
    #[serde(default = "default_adjacency_threshold")]
    pub adjacency_threshold: f64,

    #[serde(default)]
    pub path_diversity: PathDiversityConfig,
}

impl Default for AssessConfig {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            enable_spatial_inference: true,
            adjacency_threshold: default_adjacency_threshold(),
            path_diversity: PathDiversityConfig::default(),
        }
    }
}

fn default_weights() -> BTreeMap<String, f64> {
    DEFAULT_RULE_WEIGHTS
        .iter()
        .map(|(name, w)| (name.to_string(), *w))
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_adjacency_threshold() -> f64 {
    crate::spatial::DEFAULT_ADJACENCY_THRESHOLD
}

impl AssessConfig {
    /// Effective weight of a rule: 0 when unlisted, negative or non-finite
    pub fn weight(&self, rule: &str) -> f64 {
        match self.weights.get(rule) {
            Some(w) if w.is_finite() && *w > 0.0 => *w,
            _ => 0.0,
        }
    }

    /// Replace invalid values with safe ones, warning about each
    pub fn sanitized(mut self) -> Self {
        for (name, w) in self.weights.iter_mut() {
            if !w.is_finite() || *w < 0.0 {
                warn!("Ignoring invalid weight {} for rule '{}'", w, name);
                *w = 0.0;
            }
        }
        if !self.adjacency_threshold.is_finite() || self.adjacency_threshold < 0.0 {
            warn!(
                "Invalid adjacency_threshold {}, using {}",
                self.adjacency_threshold,
                default_adjacency_threshold()
            );
            self.adjacency_threshold = default_adjacency_threshold();
        }
        self.path_diversity = self.path_diversity.sanitized();
        self
    }

    pub fn with_spatial_inference(mut self, enabled: bool) -> Self {
        self.enable_spatial_inference = enabled;
        self
    }

    pub fn with_adjacency_threshold(mut self, threshold: f64) -> Self {
        self.adjacency_threshold = threshold;
        self
    }

    pub fn with_weight(mut self, rule: &str, weight: f64) -> Self {
        self.weights.insert(rule.to_string(), weight);
        self
    }
}

/// Tuning for the sampling-based path diversity rule
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PathDiversityConfig {
    /// Seed for the rule's random walks (default: 42)
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Wall-clock budget per document in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    #[serde(default = "default_walks_per_pair")]
    pub walks_per_pair: usize,

    #[serde(default = "default_pairs_per_round")]
    pub pairs_per_round: usize,

    #[serde(default = "default_min_rounds")]
    pub min_rounds: usize,

    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    /// Stop once the running mean moves less than this between rounds
    #[serde(default = "default_convergence_tolerance")]
    pub convergence_tolerance: f64,

    /// Weight multiplier for stepping onto a node the walk has not visited
    #[serde(default = "default_unvisited_bias")]
    pub unvisited_bias: f64,
}

impl Default for PathDiversityConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            timeout_secs: default_timeout_secs(),
            walks_per_pair: default_walks_per_pair(),
            pairs_per_round: default_pairs_per_round(),
            min_rounds: default_min_rounds(),
            max_rounds: default_max_rounds(),
            convergence_tolerance: default_convergence_tolerance(),
            unvisited_bias: default_unvisited_bias(),
        }
    }
}

fn default_seed() -> u64 {
    42
}
fn default_timeout_secs() -> f64 {
    30.0
}
fn default_walks_per_pair() -> usize {
    10
}
fn default_pairs_per_round() -> usize {
    24
}
fn default_min_rounds() -> usize {
    2
}
fn default_max_rounds() -> usize {
    8
}
fn default_convergence_tolerance() -> f64 {
    0.005
}
fn default_unvisited_bias() -> f64 {
    3.0
}

impl PathDiversityConfig {
    pub fn sanitized(mut self) -> Self {
        if !self.timeout_secs.is_finite() || self.timeout_secs < 0.0 {
            warn!(
                "Invalid path_diversity.timeout_secs {}, using {}",
                self.timeout_secs,
                default_timeout_secs()
            );
            self.timeout_secs = default_timeout_secs();
        }
        if self.max_rounds == 0 {
            warn!("path_diversity.max_rounds must be at least 1");
            self.max_rounds = 1;
        }
        if self.min_rounds > self.max_rounds {
            self.min_rounds = self.max_rounds;
        }
        if !self.convergence_tolerance.is_finite() || self.convergence_tolerance < 0.0 {
            self.convergence_tolerance = default_convergence_tolerance();
        }
        if !self.unvisited_bias.is_finite() || self.unvisited_bias <= 0.0 {
            self.unvisited_bias = default_unvisited_bias();
        }
        self
    }
}

/// Load `dungeon-assess.toml` or `.dungeon-assess.json` from `dir`.
///
/// Missing or broken files fall back to defaults with a warning, so a bad
/// config never blocks an assessment.
pub fn load_assess_config(dir: &Path) -> AssessConfig {
    for name in [TOML_CONFIG_NAME, JSON_CONFIG_NAME] {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    debug!("No config found in {}, using defaults", dir.display());
    AssessConfig::default()
}

/// Load an explicit config file; the extension picks the format
pub fn load_config_file(path: &Path) -> Result<AssessConfig, ConfigError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let content = || {
        std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    };

    let config: AssessConfig = match ext.as_deref() {
        Some("toml") => toml::from_str(&content()?).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?,
        Some("json") => serde_json::from_str(&content()?).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };
    Ok(config.sanitized())
}
