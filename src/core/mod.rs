//! Core functionality of the telemetry and labeling engine.
//!
//! This module contains the collector's building blocks: flow
//! identity, counter history, metric derivation, attacker tracking,
//! labeling, dataset persistence and the polling cycle.

pub mod attackers;
pub mod dataset;
pub mod engine;
pub mod flow;
pub mod history;
pub mod labeling;
pub mod metrics;
pub mod poller;

pub use attackers::AttackerRegistry;
pub use dataset::{DatasetRow, DatasetSink, DATASET_HEADER};
pub use engine::CollectorEngine;
pub use flow::{CounterSnapshot, FlowKey, FlowMatch, FlowStatsRecord};
pub use history::FlowHistoryStore;
pub use labeling::{FlowLabeler, HeuristicThresholds, LabelingMode};
pub use metrics::{compute_flow_metrics, FlowMetrics};
pub use poller::{FlowStatsPoller, FlowStatsReply, PollerState, StatsRequest, SwitchEvent};
