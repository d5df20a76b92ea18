//! Registry of addresses known to be generating attack traffic.
//!
//! Populated and cleared by the administrative API, read by the
//! labeling policy on every poll cycle. All access goes through one
//! lock so a reader never observes a partially-applied update.

use std::collections::HashSet;
use std::net::IpAddr;

use tokio::sync::RwLock;

/// Process-wide set of marked attacker addresses.
#[derive(Debug, Default)]
pub struct AttackerRegistry {
    addresses: RwLock<HashSet<IpAddr>>,
}

impl AttackerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a single address. Idempotent; returns whether the address
    /// was newly inserted.
    pub async fn mark(&self, address: IpAddr) -> bool {
        self.addresses.write().await.insert(address)
    }

    /// Mark a batch of addresses under one lock acquisition, returning
    /// how many were newly inserted.
    pub async fn mark_all<I>(&self, addresses: I) -> usize
    where
        I: IntoIterator<Item = IpAddr>,
    {
        let mut set = self.addresses.write().await;
        addresses
            .into_iter()
            .filter(|address| set.insert(*address))
            .count()
    }

    /// Empty the registry, returning how many addresses were removed.
    pub async fn clear(&self) -> usize {
        let mut set = self.addresses.write().await;
        let removed = set.len();
        set.clear();
        removed
    }

    pub async fn contains(&self, address: IpAddr) -> bool {
        self.addresses.read().await.contains(&address)
    }

    pub async fn len(&self) -> usize {
        self.addresses.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.addresses.read().await.is_empty()
    }
}
