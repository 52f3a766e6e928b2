use crate::core::repr::{
    eth_types,
    Arp,
    ArpOp,
    EthernetAddress,
    Ipv4Address,
};
use crate::core::service::{
    ethernet,
    ipv4,
    Interface,
};
use crate::Result;

/// Sends an ARP packet via an interface.
pub fn send_packet(
    interface: &mut Interface,
    arp_repr: &Arp,
    dst_addr: EthernetAddress,
) -> Result<()> {
    ethernet::send_frame(
        interface,
        arp_repr.buffer_len(),
        dst_addr,
        eth_types::ARP,
        |arp_buffer| arp_repr.serialize(arp_buffer),
    )
}

/// Receives an ARP packet from an interface.
///
/// The sender's mapping is always learned, requests for our address are
/// answered and any datagrams held for the sender are released.
pub fn recv_packet(interface: &mut Interface, arp_buffer: &[u8]) -> Result<()> {
    let arp_repr = Arp::deserialize(arp_buffer)?;

    debug!(
        "Received ARP {:?}, adding mapping from {} to {}.",
        arp_repr.op, arp_repr.source_proto_addr, arp_repr.source_hw_addr
    );
    interface
        .arp_cache
        .set_eth_addr_for_ip(arp_repr.source_proto_addr, arp_repr.source_hw_addr);

    if arp_repr.op == ArpOp::Request && arp_repr.target_proto_addr == interface.ipv4_addr {
        let arp_reply = Arp {
            op: ArpOp::Reply,
            source_hw_addr: interface.ethernet_addr,
            source_proto_addr: interface.ipv4_addr,
            target_hw_addr: arp_repr.source_hw_addr,
            target_proto_addr: arp_repr.source_proto_addr,
        };

        debug!(
            "Sending ARP reply to {}/{}.",
            arp_reply.target_proto_addr, arp_reply.target_hw_addr
        );
        if let Err(err) = send_packet(interface, &arp_reply, arp_reply.target_hw_addr) {
            debug!("Failed to queue ARP reply with {:?}.", err);
        }
    }

    flush_pending(interface, arp_repr.source_proto_addr, arp_repr.source_hw_addr);

    Ok(())
}

/// Dispatches a broadcast ARP request for an IPv4 address, unless one was sent
/// within the cooldown window.
pub fn request(interface: &mut Interface, ipv4_addr: Ipv4Address) -> Result<()> {
    if interface.arp_cooldown.is_active(ipv4_addr) {
        debug!("Suppressing ARP request for {}.", ipv4_addr);
        return Ok(());
    }

    let arp_repr = Arp {
        op: ArpOp::Request,
        source_hw_addr: interface.ethernet_addr,
        source_proto_addr: interface.ipv4_addr,
        target_hw_addr: EthernetAddress::default(),
        target_proto_addr: ipv4_addr,
    };

    debug!("Sending ARP request for {}.", ipv4_addr);
    send_packet(interface, &arp_repr, EthernetAddress::BROADCAST)?;
    interface.arp_cooldown.arm(ipv4_addr);
    Ok(())
}

/// Tries to retrieve a live Ethernet address for an IPv4 address.
pub fn eth_addr_for_ip(interface: &Interface, ipv4_addr: Ipv4Address) -> Option<EthernetAddress> {
    interface.arp_cache.eth_addr_for_ip(ipv4_addr)
}

fn flush_pending(interface: &mut Interface, ipv4_addr: Ipv4Address, eth_addr: EthernetAddress) {
    let datagrams = match interface.pending.remove(&ipv4_addr) {
        Some(datagrams) => datagrams,
        None => return,
    };

    debug!(
        "Releasing {} datagram(s) held for {}.",
        datagrams.len(),
        ipv4_addr
    );

    for datagram in datagrams {
        if let Err(err) = ipv4::send_packet(interface, &datagram, eth_addr) {
            debug!(
                "Dropping held datagram for {} with {:?}.",
                datagram.header.dst_addr, err
            );
        }
    }
}
