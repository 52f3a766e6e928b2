//! Packet processing services for different network layers.
//!
//! The `service` module deals with the translation between IPv4 datagrams
//! and Ethernet frames on a single link, including address resolution.

pub mod arp;
pub mod ethernet;
pub mod ipv4;

use std::collections::{
    HashMap,
    VecDeque,
};

use crate::core::arp_cache::{
    self,
    ArpCache,
};
use crate::core::cooldown::{
    self,
    Cooldown,
};
use crate::core::repr::{
    EthernetAddress,
    EthernetFrame,
    Ipv4Address,
    Ipv4Datagram,
};

/// Address resolution policy for an interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterfaceConfig {
    /// How long a learned IPv4 -> Ethernet mapping stays usable.
    pub arp_entry_ttl_ms: u64,
    /// Minimum time between two ARP requests for the same address.
    pub arp_request_cooldown_ms: u64,
}

impl Default for InterfaceConfig {
    fn default() -> InterfaceConfig {
        InterfaceConfig {
            arp_entry_ttl_ms: arp_cache::DEFAULT_ENTRY_TTL_MS,
            arp_request_cooldown_ms: cooldown::DEFAULT_WINDOW_MS,
        }
    }
}

/// An interface translating between IPv4 datagrams and Ethernet frames on one
/// link.
///
/// Outgoing frames are queued on an outbound sink for some external device to
/// transmit, see frames_out(). Time only advances via tick(...).
#[derive(Debug)]
pub struct Interface {
    ethernet_addr: EthernetAddress,
    ipv4_addr: Ipv4Address,
    arp_cache: ArpCache,
    arp_cooldown: Cooldown,
    /// Datagrams waiting on a next hop to be resolved, in arrival order.
    pending: HashMap<Ipv4Address, VecDeque<Ipv4Datagram>>,
    frames_out: VecDeque<EthernetFrame<Vec<u8>>>,
}

impl Interface {
    /// Creates an interface with the default resolution policy.
    pub fn new(ethernet_addr: EthernetAddress, ipv4_addr: Ipv4Address) -> Interface {
        Interface::with_config(ethernet_addr, ipv4_addr, InterfaceConfig::default())
    }

    pub fn with_config(
        ethernet_addr: EthernetAddress,
        ipv4_addr: Ipv4Address,
        config: InterfaceConfig,
    ) -> Interface {
        debug!(
            "Interface has Ethernet address {} and IPv4 address {}.",
            ethernet_addr, ipv4_addr
        );

        Interface {
            ethernet_addr,
            ipv4_addr,
            arp_cache: ArpCache::new(config.arp_entry_ttl_ms),
            arp_cooldown: Cooldown::new(config.arp_request_cooldown_ms),
            pending: HashMap::new(),
            frames_out: VecDeque::new(),
        }
    }

    pub fn ethernet_addr(&self) -> EthernetAddress {
        self.ethernet_addr
    }

    pub fn ipv4_addr(&self) -> Ipv4Address {
        self.ipv4_addr
    }

    pub fn arp_cache(&self) -> &ArpCache {
        &self.arp_cache
    }

    /// Returns the number of datagrams held for an unresolved next hop.
    pub fn pending_len(&self, next_hop: Ipv4Address) -> usize {
        self.pending.get(&next_hop).map_or(0, |datagrams| datagrams.len())
    }

    /// Returns the queue of frames awaiting transmission.
    pub fn frames_out(&mut self) -> &mut VecDeque<EthernetFrame<Vec<u8>>> {
        &mut self.frames_out
    }

    /// Removes and returns the oldest frame awaiting transmission.
    pub fn pop_frame(&mut self) -> Option<EthernetFrame<Vec<u8>>> {
        self.frames_out.pop_front()
    }

    /// Sends a datagram towards next_hop, resolving its Ethernet address first
    /// if necessary.
    pub fn send_datagram(&mut self, datagram: Ipv4Datagram, next_hop: Ipv4Address) {
        if let Err(err) = ipv4::send_datagram(self, datagram, next_hop) {
            debug!("Dropping datagram for {} with {:?}.", next_hop, err);
        }
    }

    /// Receives a raw Ethernet frame, returning any IPv4 datagram it carried.
    ///
    /// Frames that are malformed, not for us or carry ARP yield nothing.
    pub fn recv_frame(&mut self, eth_buffer: &[u8]) -> Option<Ipv4Datagram> {
        match ethernet::recv_frame(self, eth_buffer) {
            Ok(datagram) => datagram,
            Err(err) => {
                debug!("Dropping received frame with {:?}.", err);
                None
            }
        }
    }

    /// Advances the interface clock by elapsed_ms, expiring ARP mappings and
    /// request cooldowns.
    pub fn tick(&mut self, elapsed_ms: u64) {
        self.arp_cache.tick(elapsed_ms);
        self.arp_cooldown.tick(elapsed_ms);
    }
}
