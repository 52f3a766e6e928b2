//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use fwdnet::core::repr::{
    eth_types,
    Arp,
    ArpOp,
    EthernetAddress,
    EthernetFrame,
    Ipv4Address,
    Ipv4Datagram,
    Ipv4Repr,
};

lazy_static! {
    pub static ref ROUTER_ETH: EthernetAddress = EthernetAddress::new([0x02, 0, 0, 0, 0, 0x01]);

    pub static ref ROUTER_IPV4: Ipv4Address = Ipv4Address::new([10, 0, 0, 1]);

    pub static ref HOST_ETH: EthernetAddress = EthernetAddress::new([0x02, 0, 0, 0, 0, 0x0D]);

    pub static ref HOST_IPV4: Ipv4Address = Ipv4Address::new([10, 0, 0, 13]);
}

pub fn ipv4(addr: &str) -> Ipv4Address {
    addr.parse().unwrap()
}

pub fn eth(i: u8) -> EthernetAddress {
    EthernetAddress::new([0x02, 0, 0, 0, 0x10, i])
}

/// A UDP-ish datagram towards dst_addr.
pub fn datagram(dst_addr: Ipv4Address, ttl: u8) -> Ipv4Datagram {
    Ipv4Datagram {
        header: Ipv4Repr {
            ttl,
            protocol: 17,
            src_addr: ipv4("192.168.7.7"),
            dst_addr,
            ..Ipv4Repr::default()
        },
        payload: b"forward me".to_vec(),
    }
}

/// Frames an ARP message sent by (src_eth, src_ipv4).
pub fn arp_frame(
    op: ArpOp,
    src_eth: EthernetAddress,
    src_ipv4: Ipv4Address,
    dst_eth: EthernetAddress,
    target_ipv4: Ipv4Address,
) -> Vec<u8> {
    let arp = Arp {
        op,
        source_hw_addr: src_eth,
        source_proto_addr: src_ipv4,
        target_hw_addr: if op == ArpOp::Request {
            EthernetAddress::default()
        } else {
            dst_eth
        },
        target_proto_addr: target_ipv4,
    };
    let mut arp_buffer = vec![0; arp.buffer_len()];
    arp.serialize(&mut arp_buffer).unwrap();
    eth_frame(src_eth, dst_eth, eth_types::ARP, &arp_buffer)
}

/// Frames a datagram sent by src_eth.
pub fn ipv4_frame(
    src_eth: EthernetAddress,
    dst_eth: EthernetAddress,
    datagram: &Ipv4Datagram,
) -> Vec<u8> {
    eth_frame(src_eth, dst_eth, eth_types::IPV4, &datagram.to_bytes().unwrap())
}

pub fn eth_frame(
    src_eth: EthernetAddress,
    dst_eth: EthernetAddress,
    payload_type: u16,
    payload: &[u8],
) -> Vec<u8> {
    let eth_frame_len = EthernetFrame::<&[u8]>::buffer_len(payload.len());
    let mut eth_frame = EthernetFrame::try_new(vec![0; eth_frame_len]).unwrap();
    eth_frame.set_src_addr(src_eth);
    eth_frame.set_dst_addr(dst_eth);
    eth_frame.set_payload_type(payload_type);
    eth_frame.payload_mut().copy_from_slice(payload);
    eth_frame.into_inner()
}

/// Decodes the ARP message carried by a frame, if any.
pub fn as_arp<T: AsRef<[u8]>>(eth_frame: &EthernetFrame<T>) -> Option<Arp> {
    if eth_frame.payload_type() != eth_types::ARP {
        return None;
    }
    Arp::deserialize(eth_frame.payload()).ok()
}

/// Decodes the datagram carried by a frame, if any.
pub fn as_datagram<T: AsRef<[u8]>>(eth_frame: &EthernetFrame<T>) -> Option<Ipv4Datagram> {
    if eth_frame.payload_type() != eth_types::IPV4 {
        return None;
    }
    Ipv4Datagram::parse(eth_frame.payload()).ok()
}
