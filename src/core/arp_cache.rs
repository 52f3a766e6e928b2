use std::collections::HashMap;

use crate::core::repr::{
    EthernetAddress,
    Ipv4Address,
};

/// Default lifetime of a learned mapping in milliseconds.
pub const DEFAULT_ENTRY_TTL_MS: u64 = 30_000;

#[derive(Clone, Copy, Debug)]
struct Entry {
    eth_addr: EthernetAddress,
    ttl_ms: u64,
}

/// Maintains an expiring set of IPv4 -> Ethernet address mappings.
///
/// Time only advances through tick(...), so expiry is deterministic.
#[derive(Clone, Debug)]
pub struct ArpCache {
    entries: HashMap<Ipv4Address, Entry>,
    entry_ttl_ms: u64,
}

impl ArpCache {
    /// Creates an ARP cache where Ethernet address mappings expire after
    /// entry_ttl_ms milliseconds.
    pub fn new(entry_ttl_ms: u64) -> ArpCache {
        ArpCache {
            entries: HashMap::new(),
            entry_ttl_ms,
        }
    }

    /// Lookup the Ethernet address for an IPv4 address.
    pub fn eth_addr_for_ip(&self, ipv4_addr: Ipv4Address) -> Option<EthernetAddress> {
        self.entries
            .get(&ipv4_addr)
            .filter(|entry| entry.ttl_ms > 0)
            .map(|entry| entry.eth_addr)
    }

    /// Create or update the Ethernet address mapping for an IPv4 address,
    /// resetting its lifetime.
    pub fn set_eth_addr_for_ip(&mut self, ipv4_addr: Ipv4Address, eth_addr: EthernetAddress) {
        let ttl_ms = self.entry_ttl_ms;
        self.entries.insert(ipv4_addr, Entry { eth_addr, ttl_ms });
    }

    /// Returns the remaining lifetime of a mapping in milliseconds.
    pub fn ttl_for_ip(&self, ipv4_addr: Ipv4Address) -> Option<u64> {
        self.entries.get(&ipv4_addr).map(|entry| entry.ttl_ms)
    }

    /// Ages every mapping by elapsed_ms, purging those with no life left.
    pub fn tick(&mut self, elapsed_ms: u64) {
        self.entries.retain(|ipv4_addr, entry| {
            if entry.ttl_ms <= elapsed_ms {
                debug!("ARP mapping {} -> {} expired.", ipv4_addr, entry.eth_addr);
                false
            } else {
                entry.ttl_ms -= elapsed_ms;
                true
            }
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ArpCache {
    fn default() -> ArpCache {
        ArpCache::new(DEFAULT_ENTRY_TTL_MS)
    }
}
