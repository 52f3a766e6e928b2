//! Static IPv4 routes with longest prefix match lookup.

use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};
use std::slice::Iter;

use crate::core::repr::{
    Ipv4Address,
    Ipv4AddressCidr,
};

/// A route for datagrams whose destination falls within prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    pub prefix: Ipv4AddressCidr,
    /// Gateway to forward to. None means the prefix is directly attached.
    pub next_hop: Option<Ipv4Address>,
    /// Index of the interface to send out on.
    pub interface_num: usize,
}

impl Route {
    /// Returns the address a datagram for dst_addr should be handed to.
    pub fn next_hop_for(&self, dst_addr: Ipv4Address) -> Ipv4Address {
        self.next_hop.unwrap_or(dst_addr)
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self.next_hop {
            Some(next_hop) => write!(
                f,
                "{} => {} on interface {}",
                self.prefix, next_hop, self.interface_num
            ),
            None => write!(
                f,
                "{} => (direct) on interface {}",
                self.prefix, self.interface_num
            ),
        }
    }
}

/// An append only list of routes.
#[derive(Clone, Debug, Default)]
pub struct RoutingTable {
    routes: Vec<Route>,
}

impl RoutingTable {
    pub fn new() -> RoutingTable {
        RoutingTable { routes: Vec::new() }
    }

    /// Appends a route. Overlapping and duplicate prefixes are fine, they are
    /// settled by best_match(...).
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Finds the matching route with the longest prefix.
    ///
    /// When several matching routes share the longest prefix, the one added
    /// first wins.
    pub fn best_match(&self, dst_addr: Ipv4Address) -> Option<&Route> {
        let mut best: Option<&Route> = None;

        for route in self.routes.iter().filter(|route| route.prefix.is_member(dst_addr)) {
            let longer = match best {
                Some(best) => route.prefix.subnet_len() > best.prefix.subnet_len(),
                None => true,
            };

            if longer {
                best = Some(route);
            }
        }

        best
    }

    pub fn iter(&self) -> Iter<Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(prefix: &str, next_hop: Option<&str>, interface_num: usize) -> Route {
        Route {
            prefix: prefix.parse().unwrap(),
            next_hop: next_hop.map(|next_hop| next_hop.parse().unwrap()),
            interface_num,
        }
    }

    fn ipv4(addr: &str) -> Ipv4Address {
        addr.parse().unwrap()
    }

    #[test]
    fn test_empty_table() {
        assert_matches!(RoutingTable::new().best_match(ipv4("10.0.0.1")), None);
    }

    #[test]
    fn test_no_match() {
        let mut table = RoutingTable::new();
        table.add_route(route("10.0.0.0/8", None, 0));
        assert_matches!(table.best_match(ipv4("11.0.0.1")), None);
    }

    #[test]
    fn test_longest_prefix_wins_regardless_of_order() {
        let short = route("10.0.0.0/8", None, 0);
        let long = route("10.0.1.0/24", None, 1);

        let mut table = RoutingTable::new();
        table.add_route(short);
        table.add_route(long);
        assert_eq!(table.best_match(ipv4("10.0.1.5")), Some(&long));
        assert_eq!(table.best_match(ipv4("10.0.2.5")), Some(&short));

        let mut table = RoutingTable::new();
        table.add_route(long);
        table.add_route(short);
        assert_eq!(table.best_match(ipv4("10.0.1.5")), Some(&long));
    }

    #[test]
    fn test_first_added_wins_tie() {
        let first = route("10.0.0.0/8", Some("10.0.0.1"), 0);
        let second = route("10.9.9.9/8", Some("10.0.0.2"), 1);

        let mut table = RoutingTable::new();
        table.add_route(first);
        table.add_route(second);
        assert_eq!(table.best_match(ipv4("10.3.3.3")), Some(&first));
    }

    #[test]
    fn test_default_route() {
        let default = route("0.0.0.0/0", Some("171.67.76.1"), 0);
        let host = route("192.168.0.7/32", None, 2);

        let mut table = RoutingTable::new();
        table.add_route(default);
        table.add_route(host);
        assert_eq!(table.best_match(ipv4("8.8.8.8")), Some(&default));
        assert_eq!(table.best_match(ipv4("192.168.0.7")), Some(&host));
        assert_eq!(table.best_match(ipv4("192.168.0.8")), Some(&default));
    }

    #[test]
    fn test_prefix_host_bits_ignored() {
        let mut table = RoutingTable::new();
        table.add_route(route("10.0.1.77/24", None, 0));
        assert_matches!(table.best_match(ipv4("10.0.1.200")), Some(_));
    }

    #[test]
    fn test_next_hop_for() {
        assert_eq!(
            route("10.0.0.0/8", None, 0).next_hop_for(ipv4("10.1.2.3")),
            ipv4("10.1.2.3")
        );
        assert_eq!(
            route("10.0.0.0/8", Some("10.0.0.1"), 0).next_hop_for(ipv4("10.1.2.3")),
            ipv4("10.0.0.1")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            route("10.0.0.0/8", None, 1).to_string(),
            "10.0.0.0/8 => (direct) on interface 1"
        );
        assert_eq!(
            route("0.0.0.0/0", Some("10.0.0.1"), 0).to_string(),
            "0.0.0.0/0 => 10.0.0.1 on interface 0"
        );
    }
}
