use crate::core::repr::{
    eth_types,
    EthernetAddress,
    EthernetFrame,
    Ipv4Datagram,
};
use crate::core::service::{
    arp,
    ipv4,
    Interface,
};
use crate::{
    Error,
    Result,
};

/// Queues an Ethernet frame on the interface's outbound sink.
///
/// The source address is filled in with the interface address and f is
/// responsible for writing the payload_len byte payload.
pub fn send_frame<F>(
    interface: &mut Interface,
    payload_len: usize,
    dst_addr: EthernetAddress,
    payload_type: u16,
    f: F,
) -> Result<()>
where
    F: FnOnce(&mut [u8]) -> Result<()>,
{
    let eth_frame_len = EthernetFrame::<&[u8]>::buffer_len(payload_len);
    let mut eth_frame = EthernetFrame::try_new(vec![0; eth_frame_len])?;
    eth_frame.set_src_addr(interface.ethernet_addr);
    eth_frame.set_dst_addr(dst_addr);
    eth_frame.set_payload_type(payload_type);
    f(eth_frame.payload_mut())?;
    interface.frames_out.push_back(eth_frame);
    Ok(())
}

/// Receives an Ethernet frame from the link.
///
/// IPv4 payloads are parsed and returned for delivery, ARP payloads update
/// the interface's resolution state and yield nothing.
pub fn recv_frame(interface: &mut Interface, eth_buffer: &[u8]) -> Result<Option<Ipv4Datagram>> {
    let eth_frame = EthernetFrame::try_new(eth_buffer)?;

    if eth_frame.dst_addr() != interface.ethernet_addr && !eth_frame.dst_addr().is_broadcast() {
        debug!(
            "Ignoring Ethernet frame with destination {}.",
            eth_frame.dst_addr()
        );
        return Err(Error::Ignored);
    }

    match eth_frame.payload_type() {
        eth_types::IPV4 => ipv4::recv_packet(interface, eth_frame.payload()).map(Some),
        eth_types::ARP => arp::recv_packet(interface, eth_frame.payload()).map(|_| None),
        i => {
            debug!("Ignoring Ethernet frame with type {:#06x}.", i);
            Err(Error::Unsupported)
        }
    }
}
