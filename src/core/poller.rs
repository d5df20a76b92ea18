//! Periodic flow-stats polling.
//!
//! The wire protocol lives outside this crate; the poller talks to it
//! through two channels. Inbound, an unordered stream of switch
//! events: datapath lifecycle and per-datapath counter-reply batches.
//! Outbound, stats requests the protocol layer turns into actual
//! flow-stats messages. On every timer tick the poller requests
//! counters for each known datapath; each reply batch is processed
//! independently as it arrives.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::sync::mpsc;
use tokio::time;

use crate::core::engine::CollectorEngine;
use crate::core::flow::FlowStatsRecord;

/// Counter-reply batch for one datapath.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowStatsReply {
    pub datapath_id: u64,
    pub records: Vec<FlowStatsRecord>,
}

/// Request for the protocol layer to poll one datapath's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsRequest {
    pub datapath_id: u64,
}

/// Events delivered by the protocol layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchEvent {
    DatapathConnected(u64),
    DatapathDisconnected(u64),
    FlowStatsReply(FlowStatsReply),
}

/// Poller phase: waiting for the next tick, or with requests
/// outstanding for one or more datapaths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Collecting,
}

/// Drives the periodic collection cycle against the engine.
pub struct FlowStatsPoller {
    engine: Arc<CollectorEngine>,
    events: mpsc::Receiver<SwitchEvent>,
    requests: mpsc::Sender<StatsRequest>,
    poll_interval: Duration,
    datapaths: HashSet<u64>,
    outstanding: HashSet<u64>,
    state: PollerState,
}

impl FlowStatsPoller {
    pub fn new(
        engine: Arc<CollectorEngine>,
        events: mpsc::Receiver<SwitchEvent>,
        requests: mpsc::Sender<StatsRequest>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            engine,
            events,
            requests,
            poll_interval,
            datapaths: HashSet::new(),
            outstanding: HashSet::new(),
            state: PollerState::Idle,
        }
    }

    /// Run until the event channel closes. There is no terminal state
    /// in the cycle itself; it repeats until process shutdown.
    pub async fn run(mut self) {
        info!(
            "Starting flow stats poller (interval: {:?})",
            self.poll_interval
        );
        let mut ticker = time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.begin_cycle(),
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => {
                        info!("Switch event channel closed, stopping poller");
                        break;
                    }
                },
            }
        }
    }

    /// Issue one stats request per known datapath.
    ///
    /// Requests are fire-and-forget: a full or closed southbound
    /// channel drops that datapath's request for this tick rather than
    /// blocking the loop.
    fn begin_cycle(&mut self) {
        for datapath_id in &self.datapaths {
            match self.requests.try_send(StatsRequest {
                datapath_id: *datapath_id,
            }) {
                Ok(()) => {
                    self.outstanding.insert(*datapath_id);
                }
                Err(e) => warn!("Dropping stats request for datapath {}: {}", datapath_id, e),
            }
        }

        if !self.outstanding.is_empty() {
            self.state = PollerState::Collecting;
        }
    }

    async fn handle_event(&mut self, event: SwitchEvent) {
        match event {
            SwitchEvent::DatapathConnected(id) => {
                info!("Switch connected: {}", id);
                self.datapaths.insert(id);
            }
            SwitchEvent::DatapathDisconnected(id) => {
                info!("Switch disconnected: {}", id);
                self.datapaths.remove(&id);
                self.outstanding.remove(&id);
                self.settle();
            }
            SwitchEvent::FlowStatsReply(reply) => {
                self.engine.process_reply(&reply).await;
                self.outstanding.remove(&reply.datapath_id);
                self.settle();
            }
        }
    }

    fn settle(&mut self) {
        if self.outstanding.is_empty() {
            self.state = PollerState::Idle;
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }
}
