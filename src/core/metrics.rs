//! Derived per-flow rate and ratio metrics.
//!
//! Rates are computed from the counter delta against the previous
//! snapshot whenever that delta is valid, and fall back to averaging
//! over the rule's own lifetime otherwise (first observation, zero
//! elapsed time, or an apparent counter reset). Every division guards
//! the zero-denominator case by producing 0.

use crate::core::flow::CounterSnapshot;

/// Metrics derived for one (flow, poll) observation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlowMetrics {
    /// Rule lifetime in seconds, from its own duration counters.
    pub duration: f64,
    /// Packets per second.
    pub packet_rate: f64,
    /// Bytes per second.
    pub byte_rate: f64,
    /// Seconds since the previous observation of this flow; 0 when no
    /// valid previous observation exists.
    pub inter_arrival_time: f64,
    /// Mean packet size in bytes.
    pub bytes_per_packet: f64,
}

/// Compute metrics for `current`, optionally against the `previous`
/// snapshot stored for the same flow.
///
/// A previous snapshot is only trusted when its packet count does not
/// exceed the current one; a decrease means the rule expired and was
/// reinstalled, so its counters describe a different incarnation.
pub fn compute_flow_metrics(
    current: &CounterSnapshot,
    previous: Option<&CounterSnapshot>,
    duration_sec: u32,
    duration_nsec: u32,
) -> FlowMetrics {
    let duration = f64::from(duration_sec) + f64::from(duration_nsec) / 1e9;

    let (packet_rate, byte_rate, inter_arrival_time) = match previous {
        Some(prev) if current.packet_count >= prev.packet_count && duration > 0.0 => {
            let elapsed = current.timestamp - prev.timestamp;
            if elapsed > 0.0 {
                (
                    (current.packet_count - prev.packet_count) as f64 / elapsed,
                    current.byte_count.saturating_sub(prev.byte_count) as f64 / elapsed,
                    elapsed,
                )
            } else {
                (0.0, 0.0, elapsed)
            }
        }
        _ if duration > 0.0 => (
            current.packet_count as f64 / duration,
            current.byte_count as f64 / duration,
            0.0,
        ),
        _ => (0.0, 0.0, 0.0),
    };

    let bytes_per_packet = if current.packet_count > 0 {
        current.byte_count as f64 / current.packet_count as f64
    } else {
        0.0
    };

    FlowMetrics {
        duration,
        packet_rate,
        byte_rate,
        inter_arrival_time,
        bytes_per_packet,
    }
}
