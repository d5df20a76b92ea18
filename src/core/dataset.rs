//! Append-only CSV persistence of labeled flow observations.
//!
//! One file per run, named after the engine's start time. The header
//! is written exactly once at initialization; afterwards each append
//! opens the file, writes one row, flushes and releases it, so a
//! failure mid-write never corrupts previously-written rows and no
//! handle stays open between calls.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::info;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::core::flow::{FlowKey, FlowStatsRecord};
use crate::core::metrics::FlowMetrics;
use crate::utils::get_current_timestamp;

/// Errors that can occur while persisting dataset rows
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Column order of the dataset file. Several columns intentionally
/// duplicate others (flow_speed, packets_per_flow, bytes_per_flow,
/// flow_duration, active_time) for downstream feature-engineering
/// compatibility.
pub const DATASET_HEADER: [&str; 25] = [
    "timestamp",
    "datapath_id",
    "flow_id",
    "src_ip",
    "dst_ip",
    "src_port",
    "dst_port",
    "protocol",
    "duration_sec",
    "duration_nsec",
    "idle_timeout",
    "hard_timeout",
    "priority",
    "packet_count",
    "byte_count",
    "packet_rate",
    "byte_rate",
    "flow_speed",
    "packets_per_flow",
    "bytes_per_packet",
    "bytes_per_flow",
    "flow_duration",
    "flow_iat",
    "active_time",
    "label",
];

/// One (flow, poll) observation, in the exact column order of
/// [`DATASET_HEADER`]. Rows are written once and never revisited.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DatasetRow {
    pub timestamp: String,
    pub datapath_id: u64,
    pub flow_id: String,
    pub src_ip: String,
    pub dst_ip: String,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol: u8,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub priority: u16,
    pub packet_count: u64,
    pub byte_count: u64,
    pub packet_rate: f64,
    pub byte_rate: f64,
    pub flow_speed: f64,
    pub packets_per_flow: u64,
    pub bytes_per_packet: f64,
    pub bytes_per_flow: u64,
    pub flow_duration: f64,
    pub flow_iat: f64,
    pub active_time: f64,
    pub label: u8,
}

impl DatasetRow {
    /// Assemble a row from the resolved key, the raw rule record and
    /// the derived metrics, stamped with the current wall-clock time.
    pub fn new(key: &FlowKey, record: &FlowStatsRecord, metrics: &FlowMetrics, label: u8) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            datapath_id: key.datapath_id,
            flow_id: key.flow_id(),
            src_ip: key.src_ip.to_string(),
            dst_ip: key.dst_ip.to_string(),
            src_port: key.src_port,
            dst_port: key.dst_port,
            protocol: key.protocol,
            duration_sec: record.duration_sec,
            duration_nsec: record.duration_nsec,
            idle_timeout: record.idle_timeout,
            hard_timeout: record.hard_timeout,
            priority: record.priority,
            packet_count: record.packet_count,
            byte_count: record.byte_count,
            packet_rate: metrics.packet_rate,
            byte_rate: metrics.byte_rate,
            flow_speed: metrics.packet_rate,
            packets_per_flow: record.packet_count,
            bytes_per_packet: metrics.bytes_per_packet,
            bytes_per_flow: record.byte_count,
            flow_duration: metrics.duration,
            flow_iat: metrics.inter_arrival_time,
            active_time: metrics.duration,
            label,
        }
    }
}

/// Append-only sink for one run's dataset file.
pub struct DatasetSink {
    path: PathBuf,
    /// Serializes appends so rows from concurrently-processed replies
    /// never interleave mid-row.
    writer_lock: Mutex<()>,
}

impl DatasetSink {
    /// Create the run's dataset file under `dir` and write the header.
    ///
    /// Fatal if the file cannot be created; the caller aborts startup.
    pub fn initialize(dir: &Path) -> Result<Self, DatasetError> {
        let path = dir.join(format!("sdn_ddos_dataset_{}.csv", get_current_timestamp()));

        let file = File::create(&path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(DATASET_HEADER)?;
        writer.flush()?;

        info!("Dataset file initialized: {}", path.display());

        Ok(Self {
            path,
            writer_lock: Mutex::new(()),
        })
    }

    /// Serialize one row and append it.
    ///
    /// The file is opened, written, flushed and released within this
    /// call on every exit path.
    pub async fn append_row(&self, row: &DatasetRow) -> Result<(), DatasetError> {
        let _guard = self.writer_lock.lock().await;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.serialize(row)?;
        writer.flush()?;

        Ok(())
    }

    /// Path of the dataset file for this run.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::flow::FlowMatch;
    use std::net::Ipv4Addr;

    fn sample_row(label: u8) -> DatasetRow {
        let record = FlowStatsRecord {
            match_fields: FlowMatch {
                ipv4_src: Some(Ipv4Addr::new(10, 0, 0, 1)),
                ipv4_dst: Some(Ipv4Addr::new(10, 0, 0, 2)),
                src_port: Some(1234),
                dst_port: Some(80),
                ip_proto: Some(6),
            },
            duration_sec: 4,
            duration_nsec: 0,
            idle_timeout: 10,
            hard_timeout: 30,
            priority: 1,
            packet_count: 400,
            byte_count: 40_000,
        };
        let key = FlowKey::from_match(1, &record.match_fields);
        let metrics = FlowMetrics {
            duration: 4.0,
            packet_rate: 100.0,
            byte_rate: 10_000.0,
            inter_arrival_time: 2.0,
            bytes_per_packet: 100.0,
        };
        DatasetRow::new(&key, &record, &metrics, label)
    }

    #[tokio::test]
    async fn initialize_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DatasetSink::initialize(dir.path()).unwrap();

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], DATASET_HEADER.join(","));
    }

    #[tokio::test]
    async fn append_adds_one_line_per_row_with_fixed_columns() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DatasetSink::initialize(dir.path()).unwrap();

        sink.append_row(&sample_row(0)).await.unwrap();
        sink.append_row(&sample_row(1)).await.unwrap();
        sink.append_row(&sample_row(0)).await.unwrap();

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        for line in &lines {
            assert_eq!(line.split(',').count(), DATASET_HEADER.len());
        }
    }

    #[tokio::test]
    async fn row_columns_follow_the_schema() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DatasetSink::initialize(dir.path()).unwrap();
        sink.append_row(&sample_row(1)).await.unwrap();

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let row = contents.lines().nth(1).unwrap();
        let fields: Vec<&str> = row.split(',').collect();

        assert_eq!(fields[1], "1"); // datapath_id
        assert_eq!(fields[2], "1_10.0.0.1_10.0.0.2_1234_80_6"); // flow_id
        assert_eq!(fields[3], "10.0.0.1"); // src_ip
        assert_eq!(fields[13], "400"); // packet_count
        assert_eq!(fields[15], fields[17]); // packet_rate == flow_speed
        assert_eq!(fields[13], fields[18]); // packet_count == packets_per_flow
        assert_eq!(fields[14], fields[20]); // byte_count == bytes_per_flow
        assert_eq!(fields[21], fields[23]); // flow_duration == active_time
        assert_eq!(fields[24], "1"); // label
    }

    #[tokio::test]
    async fn rows_survive_concurrent_appends_intact() {
        let dir = tempfile::tempdir().unwrap();
        let sink = std::sync::Arc::new(DatasetSink::initialize(dir.path()).unwrap());

        let mut handles = Vec::new();
        for i in 0..8u8 {
            let sink = sink.clone();
            handles.push(tokio::spawn(async move {
                sink.append_row(&sample_row(i % 2)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 9);
        for line in &lines {
            assert_eq!(line.split(',').count(), DATASET_HEADER.len());
        }
    }
}
