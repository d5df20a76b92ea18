//! Flow labeling policies.
//!
//! Two interchangeable strategies, selected at configuration time.
//! Ground-truth labeling trusts only the attacker registry; heuristic
//! labeling additionally infers maliciousness from traffic-rate
//! thresholds, kept for exploratory datasets where no authoritative
//! attacker list is maintained.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::attackers::AttackerRegistry;
use crate::core::metrics::FlowMetrics;

/// Errors that can occur while configuring labeling
#[derive(Error, Debug)]
pub enum LabelingError {
    #[error("unknown labeling mode: {0}")]
    UnknownMode(String),
}

/// Which labeling strategy to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelingMode {
    /// Label 1 iff the source address is in the attacker registry.
    GroundTruth,
    /// Registry first, then rate-based rules in fixed precedence.
    Heuristic,
}

impl FromStr for LabelingMode {
    type Err = LabelingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ground_truth" | "ground-truth" => Ok(Self::GroundTruth),
            "heuristic" => Ok(Self::Heuristic),
            other => Err(LabelingError::UnknownMode(other.to_string())),
        }
    }
}

/// Thresholds for the heuristic rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicThresholds {
    /// Packet rate alone that marks a flood (packets per second)
    pub flood_packet_rate: f64,
    /// Packet rate combined with small packets (packets per second)
    pub small_packet_rate: f64,
    /// Mean packet size below which the small-packet rule applies (bytes)
    pub small_packet_bytes: f64,
    /// Packet rate of a sustained attack (packets per second)
    pub sustained_packet_rate: f64,
    /// Cumulative packet count of a sustained attack
    pub sustained_packet_count: u64,
}

impl Default for HeuristicThresholds {
    fn default() -> Self {
        Self {
            flood_packet_rate: 1000.0,
            small_packet_rate: 500.0,
            small_packet_bytes: 100.0,
            sustained_packet_rate: 300.0,
            sustained_packet_count: 5000,
        }
    }
}

/// Labeler applying the configured strategy to one observation.
#[derive(Debug, Clone)]
pub struct FlowLabeler {
    mode: LabelingMode,
    thresholds: HeuristicThresholds,
}

impl FlowLabeler {
    pub fn new(mode: LabelingMode, thresholds: HeuristicThresholds) -> Self {
        Self { mode, thresholds }
    }

    /// Label one observation: 1 for attack traffic, 0 for normal.
    ///
    /// The registry is consulted exactly once per call; there is no
    /// other state.
    pub async fn label(
        &self,
        registry: &AttackerRegistry,
        src_ip: Ipv4Addr,
        metrics: &FlowMetrics,
        packet_count: u64,
    ) -> u8 {
        let known_attacker = registry.contains(IpAddr::V4(src_ip)).await;
        match self.mode {
            LabelingMode::GroundTruth => u8::from(known_attacker),
            LabelingMode::Heuristic => self.heuristic_label(known_attacker, metrics, packet_count),
        }
    }

    /// Fixed-precedence heuristic rules; first match wins.
    fn heuristic_label(&self, known_attacker: bool, metrics: &FlowMetrics, packet_count: u64) -> u8 {
        let t = &self.thresholds;

        if known_attacker {
            return 1;
        }
        if metrics.packet_rate > t.flood_packet_rate {
            return 1;
        }
        if metrics.packet_rate > t.small_packet_rate && metrics.bytes_per_packet < t.small_packet_bytes {
            return 1;
        }
        if metrics.packet_rate > t.sustained_packet_rate && packet_count > t.sustained_packet_count {
            return 1;
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(packet_rate: f64, bytes_per_packet: f64) -> FlowMetrics {
        FlowMetrics {
            packet_rate,
            bytes_per_packet,
            ..FlowMetrics::default()
        }
    }

    fn src() -> Ipv4Addr {
        Ipv4Addr::new(10, 0, 0, 5)
    }

    #[tokio::test]
    async fn ground_truth_ignores_rates() {
        let registry = AttackerRegistry::new();
        let labeler = FlowLabeler::new(LabelingMode::GroundTruth, HeuristicThresholds::default());

        // Absent from the registry: normal even at an extreme rate.
        assert_eq!(
            labeler.label(&registry, src(), &metrics(10_000.0, 1500.0), 1).await,
            0
        );

        registry.mark(IpAddr::V4(src())).await;

        // Present: attack even with zero traffic.
        assert_eq!(labeler.label(&registry, src(), &metrics(0.0, 0.0), 0).await, 1);
    }

    #[tokio::test]
    async fn heuristic_marks_registered_attackers_first() {
        let registry = AttackerRegistry::new();
        registry.mark(IpAddr::V4(src())).await;
        let labeler = FlowLabeler::new(LabelingMode::Heuristic, HeuristicThresholds::default());

        assert_eq!(labeler.label(&registry, src(), &metrics(0.0, 0.0), 0).await, 1);
    }

    #[tokio::test]
    async fn heuristic_flood_rule() {
        let registry = AttackerRegistry::new();
        let labeler = FlowLabeler::new(LabelingMode::Heuristic, HeuristicThresholds::default());

        assert_eq!(
            labeler.label(&registry, src(), &metrics(1200.0, 1500.0), 100).await,
            1
        );
    }

    #[tokio::test]
    async fn heuristic_small_packet_rule() {
        let registry = AttackerRegistry::new();
        let labeler = FlowLabeler::new(LabelingMode::Heuristic, HeuristicThresholds::default());

        assert_eq!(labeler.label(&registry, src(), &metrics(600.0, 50.0), 100).await, 1);
        // Same rate with large packets does not match.
        assert_eq!(labeler.label(&registry, src(), &metrics(600.0, 1400.0), 100).await, 0);
    }

    #[tokio::test]
    async fn heuristic_sustained_rule() {
        let registry = AttackerRegistry::new();
        let labeler = FlowLabeler::new(LabelingMode::Heuristic, HeuristicThresholds::default());

        assert_eq!(
            labeler.label(&registry, src(), &metrics(400.0, 1400.0), 6000).await,
            1
        );
        assert_eq!(
            labeler.label(&registry, src(), &metrics(400.0, 1400.0), 100).await,
            0
        );
    }

    #[tokio::test]
    async fn heuristic_defaults_to_normal() {
        let registry = AttackerRegistry::new();
        let labeler = FlowLabeler::new(LabelingMode::Heuristic, HeuristicThresholds::default());

        assert_eq!(labeler.label(&registry, src(), &metrics(100.0, 800.0), 100).await, 0);
    }

    #[test]
    fn mode_parses_from_config_strings() {
        assert_eq!("heuristic".parse::<LabelingMode>().unwrap(), LabelingMode::Heuristic);
        assert_eq!(
            "ground_truth".parse::<LabelingMode>().unwrap(),
            LabelingMode::GroundTruth
        );
        assert_eq!(
            "ground-truth".parse::<LabelingMode>().unwrap(),
            LabelingMode::GroundTruth
        );
        assert!("rate_based".parse::<LabelingMode>().is_err());
    }
}
