//! The collector engine: per-record telemetry pipeline and the state
//! it runs over.
//!
//! All mutable collector state (flow history, attacker registry) lives
//! behind this one object, which is shared by reference between the
//! poller task and the administrative API. Each reply batch is
//! processed independently; a failure on one row is logged and skipped
//! without aborting the batch or the cycle.

use std::sync::Arc;

use log::{debug, warn};

use crate::core::attackers::AttackerRegistry;
use crate::core::dataset::{DatasetError, DatasetRow, DatasetSink};
use crate::core::flow::{CounterSnapshot, FlowKey, FlowStatsRecord};
use crate::core::history::FlowHistoryStore;
use crate::core::labeling::FlowLabeler;
use crate::core::metrics::compute_flow_metrics;
use crate::core::poller::FlowStatsReply;
use crate::utils::unix_time;

/// Shared collector state plus the record-processing pipeline.
pub struct CollectorEngine {
    history: FlowHistoryStore,
    attackers: Arc<AttackerRegistry>,
    labeler: FlowLabeler,
    sink: DatasetSink,
}

impl CollectorEngine {
    pub fn new(
        history: FlowHistoryStore,
        attackers: Arc<AttackerRegistry>,
        labeler: FlowLabeler,
        sink: DatasetSink,
    ) -> Self {
        Self {
            history,
            attackers,
            labeler,
            sink,
        }
    }

    /// Process one per-datapath reply batch, returning the number of
    /// rows appended.
    pub async fn process_reply(&self, reply: &FlowStatsReply) -> usize {
        let observed_at = unix_time();
        let mut rows = 0;

        for record in &reply.records {
            // Priority 0 is the table-miss entry: unmatched traffic,
            // not a classifiable flow.
            if record.priority == 0 {
                continue;
            }

            match self.process_record(reply.datapath_id, record, observed_at).await {
                Ok(()) => rows += 1,
                Err(e) => warn!(
                    "Skipping flow record on datapath {}: {}",
                    reply.datapath_id, e
                ),
            }
        }

        debug!(
            "Datapath {}: {} of {} records appended",
            reply.datapath_id,
            rows,
            reply.records.len()
        );
        rows
    }

    async fn process_record(
        &self,
        datapath_id: u64,
        record: &FlowStatsRecord,
        observed_at: f64,
    ) -> Result<(), DatasetError> {
        let key = FlowKey::from_match(datapath_id, &record.match_fields);
        let current = CounterSnapshot {
            timestamp: observed_at,
            packet_count: record.packet_count,
            byte_count: record.byte_count,
        };

        let previous = self.history.get(&key).await;
        let metrics = compute_flow_metrics(&current, previous.as_ref(), record.duration_sec, record.duration_nsec);
        let label = self
            .labeler
            .label(&self.attackers, key.src_ip, &metrics, record.packet_count)
            .await;

        let row = DatasetRow::new(&key, record, &metrics, label);
        self.sink.append_row(&row).await?;

        // Only a persisted observation becomes the flow's history.
        self.history.put(key, current).await;
        Ok(())
    }

    pub fn history(&self) -> &FlowHistoryStore {
        &self.history
    }

    pub fn attackers(&self) -> &AttackerRegistry {
        &self.attackers
    }

    pub fn sink(&self) -> &DatasetSink {
        &self.sink
    }
}
