//! Forwarding of IPv4 datagrams between several interfaces.

use std::collections::VecDeque;

use crate::core::dev::Device;
use crate::core::repr::{
    EthernetFrame,
    Ipv4Address,
    Ipv4AddressCidr,
    Ipv4Datagram,
};
use crate::core::route::{
    Route,
    RoutingTable,
};
use crate::core::service::Interface;
use crate::{
    Error,
    Result,
};

/// An interface attached to a router, along with the datagrams it received
/// that are waiting to be routed.
#[derive(Debug)]
pub struct RouterInterface {
    interface: Interface,
    datagrams_in: VecDeque<Ipv4Datagram>,
}

impl RouterInterface {
    fn new(interface: Interface) -> RouterInterface {
        RouterInterface {
            interface,
            datagrams_in: VecDeque::new(),
        }
    }

    /// Receives a raw Ethernet frame, queueing any datagram it carried for
    /// routing.
    pub fn recv_frame(&mut self, eth_buffer: &[u8]) {
        if let Some(datagram) = self.interface.recv_frame(eth_buffer) {
            self.datagrams_in.push_back(datagram);
        }
    }

    /// Returns the queue of received datagrams waiting to be routed.
    pub fn datagrams_in(&mut self) -> &mut VecDeque<Ipv4Datagram> {
        &mut self.datagrams_in
    }

    /// Removes and returns the oldest frame awaiting transmission.
    pub fn pop_frame(&mut self) -> Option<EthernetFrame<Vec<u8>>> {
        self.interface.pop_frame()
    }

    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut Interface {
        &mut self.interface
    }
}

/// A router forwarding datagrams between its interfaces based on a static
/// routing table.
#[derive(Debug, Default)]
pub struct Router {
    interfaces: Vec<RouterInterface>,
    routing_table: RoutingTable,
}

impl Router {
    pub fn new() -> Router {
        Router {
            interfaces: Vec::new(),
            routing_table: RoutingTable::new(),
        }
    }

    /// Attaches an interface, returning the index routes use to refer to it.
    pub fn add_interface(&mut self, interface: Interface) -> usize {
        info!(
            "Attaching interface {} ({}/{}).",
            self.interfaces.len(),
            interface.ipv4_addr(),
            interface.ethernet_addr()
        );
        self.interfaces.push(RouterInterface::new(interface));
        self.interfaces.len() - 1
    }

    /// Returns an attached interface.
    ///
    /// # Panics
    ///
    /// Causes a panic if interface_num was not returned by add_interface(...).
    pub fn interface(&self, interface_num: usize) -> &RouterInterface {
        &self.interfaces[interface_num]
    }

    /// Returns an attached interface.
    ///
    /// # Panics
    ///
    /// Causes a panic if interface_num was not returned by add_interface(...).
    pub fn interface_mut(&mut self, interface_num: usize) -> &mut RouterInterface {
        &mut self.interfaces[interface_num]
    }

    pub fn interfaces_len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    /// Installs a route for datagrams with destinations within prefix.
    ///
    /// A next_hop of None means the prefix is directly attached to the
    /// interface. Fails if interface_num is not an attached interface.
    pub fn add_route(
        &mut self,
        prefix: Ipv4AddressCidr,
        next_hop: Option<Ipv4Address>,
        interface_num: usize,
    ) -> Result<()> {
        if interface_num >= self.interfaces.len() {
            warn!(
                "Rejecting route {} for unknown interface {}.",
                prefix, interface_num
            );
            return Err(Error::NoRoute);
        }

        let route = Route {
            prefix,
            next_hop,
            interface_num,
        };

        info!("Adding route {}.", route);
        self.routing_table.add_route(route);
        Ok(())
    }

    /// Forwards a single datagram.
    ///
    /// Datagrams whose TTL would hit zero, or that match no route, are
    /// dropped.
    pub fn route_one_datagram(&mut self, mut datagram: Ipv4Datagram) {
        let dst_addr = datagram.header.dst_addr;

        if datagram.header.ttl <= 1 {
            debug!("Dropping datagram for {} with expired TTL.", dst_addr);
            return;
        }

        datagram.header.ttl -= 1;
        datagram.header.checksum = 0;

        let route = match self.routing_table.best_match(dst_addr) {
            Some(route) => *route,
            None => {
                debug!("Dropping datagram for {} with no route.", dst_addr);
                return;
            }
        };

        let next_hop = route.next_hop_for(dst_addr);
        debug!(
            "Forwarding datagram for {} to {} on interface {}.",
            dst_addr, next_hop, route.interface_num
        );

        self.interfaces[route.interface_num]
            .interface
            .send_datagram(datagram, next_hop);
    }

    /// Routes every datagram received on every interface.
    pub fn route(&mut self) {
        for i in 0 .. self.interfaces.len() {
            while let Some(datagram) = self.interfaces[i].datagrams_in.pop_front() {
                self.route_one_datagram(datagram);
            }
        }
    }

    /// Advances the clock of every interface by elapsed_ms.
    pub fn tick(&mut self, elapsed_ms: u64) {
        for router_interface in self.interfaces.iter_mut() {
            router_interface.interface.tick(elapsed_ms);
        }
    }
}

/// Runs one iteration of a router driven by a set of devices.
///
/// devices[i] carries the frames for interface i. Every pending frame is
/// received, datagrams are routed, outbound frames are transmitted and
/// finally the router's clock advances by elapsed_ms.
pub fn poll<D: Device>(router: &mut Router, devices: &mut [D], elapsed_ms: u64) {
    if devices.len() != router.interfaces.len() {
        warn!(
            "Polling {} device(s) for {} interface(s).",
            devices.len(),
            router.interfaces.len()
        );
    }

    for (dev, router_interface) in devices.iter_mut().zip(router.interfaces.iter_mut()) {
        let mut eth_buffer = vec![0; dev.max_transmission_unit()];

        loop {
            match dev.recv(&mut eth_buffer) {
                Ok(buffer_len) => router_interface.recv_frame(&eth_buffer[.. buffer_len]),
                Err(Error::Exhausted) => break,
                Err(err) => {
                    warn!("Device::recv(...) failed with {:?}.", err);
                    break;
                }
            }
        }
    }

    router.route();

    for (dev, router_interface) in devices.iter_mut().zip(router.interfaces.iter_mut()) {
        while let Some(eth_frame) = router_interface.pop_frame() {
            if let Err(err) = dev.send(eth_frame.as_ref()) {
                warn!("Device::send(...) failed with {:?}.", err);
            }
        }
    }

    router.tick(elapsed_ms);
}
