//! Last-seen counter snapshots per flow.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::core::flow::{CounterSnapshot, FlowKey};

/// In-memory map from flow identity to the most recent counter
/// snapshot. Entries are created on first observation and overwritten
/// on every subsequent one; there is no eviction.
#[derive(Debug, Default)]
pub struct FlowHistoryStore {
    entries: RwLock<HashMap<FlowKey, CounterSnapshot>>,
}

impl FlowHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot stored for `key`, if the flow has been seen before.
    pub async fn get(&self, key: &FlowKey) -> Option<CounterSnapshot> {
        self.entries.read().await.get(key).copied()
    }

    /// Unconditionally overwrite the snapshot for `key`, returning the
    /// displaced one.
    pub async fn put(&self, key: FlowKey, snapshot: CounterSnapshot) -> Option<CounterSnapshot> {
        self.entries.write().await.insert(key, snapshot)
    }

    /// Number of flows tracked.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
