//! Flow identity and raw flow-rule statistics.
//!
//! A flow is identified by the 5-tuple of its match criteria plus the
//! datapath it was observed on. Match fields that a rule does not carry
//! (e.g. transport ports on an ICMP flow) are resolved to canonical
//! defaults once, at ingestion, so keys are always well-formed and
//! comparable.

use std::net::Ipv4Addr;

/// Match fields of a flow rule as reported by the switch.
///
/// Every field is optional; a missing field degrades the specificity of
/// the derived [`FlowKey`] rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowMatch {
    pub ipv4_src: Option<Ipv4Addr>,
    pub ipv4_dst: Option<Ipv4Addr>,
    /// TCP or UDP source port, whichever the rule matches on.
    pub src_port: Option<u16>,
    /// TCP or UDP destination port, whichever the rule matches on.
    pub dst_port: Option<u16>,
    pub ip_proto: Option<u8>,
}

/// Stable identity of one flow on one datapath.
///
/// Equal (datapath, 5-tuple) pairs always produce equal keys; nothing
/// else (rule cookies, installation time) contributes to identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowKey {
    pub datapath_id: u64,
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol: u8,
}

impl FlowKey {
    /// Derive the key for a rule's match fields, substituting the
    /// canonical defaults (0.0.0.0, port 0, protocol 0) for anything
    /// the rule does not match on.
    pub fn from_match(datapath_id: u64, fields: &FlowMatch) -> Self {
        Self {
            datapath_id,
            src_ip: fields.ipv4_src.unwrap_or(Ipv4Addr::UNSPECIFIED),
            dst_ip: fields.ipv4_dst.unwrap_or(Ipv4Addr::UNSPECIFIED),
            src_port: fields.src_port.unwrap_or(0),
            dst_port: fields.dst_port.unwrap_or(0),
            protocol: fields.ip_proto.unwrap_or(0),
        }
    }

    /// Textual flow id used in the dataset's `flow_id` column.
    pub fn flow_id(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}_{}",
            self.datapath_id, self.src_ip, self.dst_ip, self.src_port, self.dst_port, self.protocol
        )
    }
}

/// Point-in-time read of one flow rule's counters.
///
/// Counters are monotonically non-decreasing while the underlying rule
/// exists; a lower packet count than the stored snapshot signals that
/// the rule expired and was reinstalled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterSnapshot {
    /// Unix time of the observation, in seconds.
    pub timestamp: f64,
    pub packet_count: u64,
    pub byte_count: u64,
}

/// One per-rule record from a flow-stats reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowStatsRecord {
    pub match_fields: FlowMatch,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub priority: u16,
    pub packet_count: u64,
    pub byte_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_match() -> FlowMatch {
        FlowMatch {
            ipv4_src: Some(Ipv4Addr::new(10, 0, 0, 1)),
            ipv4_dst: Some(Ipv4Addr::new(10, 0, 0, 2)),
            src_port: Some(44321),
            dst_port: Some(80),
            ip_proto: Some(6),
        }
    }

    #[test]
    fn equal_tuples_produce_equal_keys() {
        let a = FlowKey::from_match(1, &full_match());
        let b = FlowKey::from_match(1, &full_match());
        assert_eq!(a, b);
    }

    #[test]
    fn any_component_distinguishes_keys() {
        let base = FlowKey::from_match(1, &full_match());

        assert_ne!(base, FlowKey::from_match(2, &full_match()));

        let mut m = full_match();
        m.ipv4_src = Some(Ipv4Addr::new(10, 0, 0, 9));
        assert_ne!(base, FlowKey::from_match(1, &m));

        let mut m = full_match();
        m.dst_port = Some(443);
        assert_ne!(base, FlowKey::from_match(1, &m));

        let mut m = full_match();
        m.ip_proto = Some(17);
        assert_ne!(base, FlowKey::from_match(1, &m));
    }

    #[test]
    fn missing_fields_resolve_to_defaults() {
        // ICMP-style rule: no transport ports.
        let m = FlowMatch {
            ipv4_src: Some(Ipv4Addr::new(10, 0, 0, 1)),
            ipv4_dst: Some(Ipv4Addr::new(10, 0, 0, 2)),
            src_port: None,
            dst_port: None,
            ip_proto: Some(1),
        };
        let key = FlowKey::from_match(3, &m);
        assert_eq!(key.src_port, 0);
        assert_eq!(key.dst_port, 0);

        let empty = FlowKey::from_match(3, &FlowMatch::default());
        assert_eq!(empty.src_ip, Ipv4Addr::UNSPECIFIED);
        assert_eq!(empty.dst_ip, Ipv4Addr::UNSPECIFIED);
        assert_eq!(empty.protocol, 0);
    }

    #[test]
    fn flow_id_joins_all_components() {
        let key = FlowKey::from_match(7, &full_match());
        assert_eq!(key.flow_id(), "7_10.0.0.1_10.0.0.2_44321_80_6");
    }
}
