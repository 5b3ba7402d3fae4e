//! Configuration module
//!
//! This module handles:
//! - Assessment configuration (dungeon-assess.toml / .dungeon-assess.json)
//! - Rule weight overrides
//! - Path diversity sampling parameters

mod assess_config;

pub use assess_config::{
    load_assess_config, load_config_file, AssessConfig, ConfigError, PathDiversityConfig,
    DEFAULT_RULE_WEIGHTS, JSON_CONFIG_NAME, TOML_CONFIG_NAME,
};
