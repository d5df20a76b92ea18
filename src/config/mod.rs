//! Configuration management for the collector.
//!
//! This module handles loading and managing application configuration
//! from environment variables and configuration files.

use std::env;
use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use crate::models::Config;

/// Load configuration from the config file and environment variables
pub fn load_config() -> Result<Config, ConfigError> {
    let config_file = env::var("CONFIG_FILE").unwrap_or_else(|_| "config/default.toml".to_string());

    let config = ConfigBuilder::builder()
        .add_source(File::with_name(&config_file))
        .add_source(Environment::default())
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("collector.poll_interval_seconds", 5)?
        .set_default("collector.dataset_dir", ".")?
        .set_default("labeling.mode", "heuristic")?
        .set_default("labeling.thresholds.flood_packet_rate", 1000.0)?
        .set_default("labeling.thresholds.small_packet_rate", 500.0)?
        .set_default("labeling.thresholds.small_packet_bytes", 100.0)?
        .set_default("labeling.thresholds.sustained_packet_rate", 300.0)?
        .set_default("labeling.thresholds.sustained_packet_count", 5000)?
        .build()?;

    config.try_deserialize()
}
