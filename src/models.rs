use serde::{Deserialize, Serialize};
use crate::core::{HeuristicThresholds, LabelingMode};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
}

/// Collector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Seconds between successive stats-request cycles
    pub poll_interval_seconds: u64,
    /// Directory the run's dataset file is created in
    pub dataset_dir: String,
}

/// Labeling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelingConfig {
    /// Labeling strategy to apply
    pub mode: LabelingMode,
    /// Thresholds for the heuristic strategy
    pub thresholds: HeuristicThresholds,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Collector configuration
    pub collector: CollectorConfig,
    /// Labeling configuration
    pub labeling: LabelingConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST")?,
                port: std::env::var("SERVER_PORT")?.parse()?,
            },
            collector: CollectorConfig {
                poll_interval_seconds: std::env::var("COLLECTOR_POLL_INTERVAL_SECS")?.parse()?,
                dataset_dir: std::env::var("COLLECTOR_DATASET_DIR")?,
            },
            labeling: LabelingConfig {
                mode: std::env::var("LABELING_MODE")?.parse()?,
                thresholds: HeuristicThresholds {
                    flood_packet_rate: std::env::var("LABELING_FLOOD_PACKET_RATE")?.parse()?,
                    small_packet_rate: std::env::var("LABELING_SMALL_PACKET_RATE")?.parse()?,
                    small_packet_bytes: std::env::var("LABELING_SMALL_PACKET_BYTES")?.parse()?,
                    sustained_packet_rate: std::env::var("LABELING_SUSTAINED_PACKET_RATE")?.parse()?,
                    sustained_packet_count: std::env::var("LABELING_SUSTAINED_PACKET_COUNT")?.parse()?,
                },
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            collector: CollectorConfig {
                poll_interval_seconds: 5,
                dataset_dir: ".".to_string(),
            },
            labeling: LabelingConfig {
                mode: LabelingMode::Heuristic,
                thresholds: HeuristicThresholds::default(),
            },
        }
    }
}
