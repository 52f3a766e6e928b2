//! Serialization and deserialization of network packets.
//!
//! The `repr` module provides abstractions for serializing and deserializing
//! frames, address resolution messages and datagrams to/from byte buffers.

pub mod arp;
pub mod ethernet;
pub mod ipv4;

pub use self::arp::{
    hw_types as arp_hw_types,
    proto_types as arp_proto_types,
    Arp,
    Op as ArpOp,
};
pub use self::ethernet::{
    eth_types,
    Address as EthernetAddress,
    Frame as EthernetFrame,
};
pub use self::ipv4::{
    protocols as ipv4_protocols,
    Address as Ipv4Address,
    AddressCidr as Ipv4AddressCidr,
    Datagram as Ipv4Datagram,
    Packet as Ipv4Packet,
    Repr as Ipv4Repr,
};
