use crate::core::repr::{
    eth_types,
    EthernetAddress,
    Ipv4Address,
    Ipv4Datagram,
};
use crate::core::service::{
    arp,
    ethernet,
    Interface,
};
use crate::Result;

/// Sends a datagram towards next_hop.
///
/// When next_hop has no Ethernet mapping yet the datagram is held until one
/// is learned, and an ARP request is dispatched unless one went out recently.
pub fn send_datagram(
    interface: &mut Interface,
    datagram: Ipv4Datagram,
    next_hop: Ipv4Address,
) -> Result<()> {
    match arp::eth_addr_for_ip(interface, next_hop) {
        Some(eth_addr) => send_packet(interface, &datagram, eth_addr),
        None => {
            debug!(
                "Holding datagram for {} until {} is resolved.",
                datagram.header.dst_addr, next_hop
            );
            interface
                .pending
                .entry(next_hop)
                .or_default()
                .push_back(datagram);
            arp::request(interface, next_hop)
        }
    }
}

/// Frames a datagram to an already resolved Ethernet address.
pub fn send_packet(
    interface: &mut Interface,
    datagram: &Ipv4Datagram,
    eth_dst_addr: EthernetAddress,
) -> Result<()> {
    ethernet::send_frame(
        interface,
        datagram.buffer_len(),
        eth_dst_addr,
        eth_types::IPV4,
        |ipv4_buffer| datagram.serialize(ipv4_buffer),
    )
}

/// Receives an IPv4 packet for delivery to the network layer.
pub fn recv_packet(_interface: &mut Interface, ipv4_buffer: &[u8]) -> Result<Ipv4Datagram> {
    Ipv4Datagram::parse(ipv4_buffer)
}
