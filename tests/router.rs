#[macro_use]
extern crate assert_matches;
#[macro_use]
extern crate lazy_static;

mod context;

use fwdnet::core::repr::{
    ArpOp,
    EthernetAddress,
    Ipv4AddressCidr,
};
use fwdnet::core::router::Router;
use fwdnet::core::service::Interface;

use crate::context::*;

fn single_link_router() -> Router {
    let mut router = Router::new();
    let interface_num = router.add_interface(Interface::new(*ROUTER_ETH, *ROUTER_IPV4));
    assert_eq!(interface_num, 0);
    router
        .add_route(format!("{}/32", *HOST_IPV4).parse().unwrap(), None, 0)
        .unwrap();
    router
}

#[test]
fn direct_route_resolves_then_forwards() {
    let _ = env_logger::try_init();
    let mut router = single_link_router();

    router.route_one_datagram(datagram(*HOST_IPV4, 64));

    // Exactly one broadcast request and the datagram is held.
    let request = router.interface_mut(0).pop_frame().unwrap();
    assert_eq!(request.dst_addr(), EthernetAddress::BROADCAST);
    let arp = as_arp(&request).unwrap();
    assert_eq!(arp.op, ArpOp::Request);
    assert_eq!(arp.source_proto_addr, *ROUTER_IPV4);
    assert_eq!(arp.target_proto_addr, *HOST_IPV4);
    assert_matches!(router.interface_mut(0).pop_frame(), None);
    assert_eq!(router.interface(0).interface().pending_len(*HOST_IPV4), 1);

    let reply = arp_frame(ArpOp::Reply, *HOST_ETH, *HOST_IPV4, *ROUTER_ETH, *ROUTER_IPV4);
    router.interface_mut(0).recv_frame(&reply);
    assert!(router.interface_mut(0).datagrams_in().is_empty());

    // Exactly one datagram frame towards the host, with TTL decremented.
    let forwarded = router.interface_mut(0).pop_frame().unwrap();
    assert_eq!(forwarded.dst_addr(), *HOST_ETH);
    assert_eq!(forwarded.src_addr(), *ROUTER_ETH);
    let forwarded = as_datagram(&forwarded).unwrap();
    assert_eq!(forwarded.header.ttl, 63);
    assert_eq!(forwarded.header.dst_addr, *HOST_IPV4);
    assert_eq!(forwarded.payload, b"forward me".to_vec());
    assert_matches!(router.interface_mut(0).pop_frame(), None);
    assert_eq!(router.interface(0).interface().pending_len(*HOST_IPV4), 0);
}

#[test]
fn resolved_mapping_skips_request_until_expiry() {
    let mut router = single_link_router();
    let reply = arp_frame(ArpOp::Reply, *HOST_ETH, *HOST_IPV4, *ROUTER_ETH, *ROUTER_IPV4);
    router.interface_mut(0).recv_frame(&reply);

    router.tick(29_000);
    router.route_one_datagram(datagram(*HOST_IPV4, 64));
    let frame = router.interface_mut(0).pop_frame().unwrap();
    assert_matches!(as_datagram(&frame), Some(_));

    router.tick(1_000);
    router.route_one_datagram(datagram(*HOST_IPV4, 64));
    let frame = router.interface_mut(0).pop_frame().unwrap();
    assert_matches!(as_arp(&frame), Some(ref arp) if arp.op == ArpOp::Request);
}

#[test]
fn queued_datagrams_flush_once_in_order() {
    let mut router = single_link_router();

    for ttl in 20 .. 25 {
        router.route_one_datagram(datagram(*HOST_IPV4, ttl));
    }
    assert_matches!(as_arp(&router.interface_mut(0).pop_frame().unwrap()), Some(_));
    assert_matches!(router.interface_mut(0).pop_frame(), None);

    // A request from the host teaches us its address just as well.
    let request = arp_frame(
        ArpOp::Request,
        *HOST_ETH,
        *HOST_IPV4,
        EthernetAddress::BROADCAST,
        *ROUTER_IPV4,
    );
    router.interface_mut(0).recv_frame(&request);

    let reply = router.interface_mut(0).pop_frame().unwrap();
    assert_eq!(reply.dst_addr(), *HOST_ETH);
    assert_matches!(as_arp(&reply), Some(ref arp) if arp.op == ArpOp::Reply);

    for ttl in 19 .. 24 {
        let frame = router.interface_mut(0).pop_frame().unwrap();
        assert_eq!(as_datagram(&frame).unwrap().header.ttl, ttl);
    }

    router.interface_mut(0).recv_frame(&request);
    let reply = router.interface_mut(0).pop_frame().unwrap();
    assert_matches!(as_arp(&reply), Some(_));
    assert_matches!(router.interface_mut(0).pop_frame(), None);
}

#[test]
fn longer_prefix_wins_regardless_of_insertion_order() {
    for &reversed in &[false, true] {
        let mut router = Router::new();
        router.add_interface(Interface::new(eth(1), ipv4("10.0.0.1")));
        router.add_interface(Interface::new(eth(2), ipv4("10.0.1.1")));

        let routes: [(Ipv4AddressCidr, usize); 2] = [
            ("10.0.0.0/8".parse().unwrap(), 0),
            ("10.0.1.0/24".parse().unwrap(), 1),
        ];
        let order: Vec<_> = if reversed {
            routes.iter().rev().collect()
        } else {
            routes.iter().collect()
        };
        for &(prefix, interface_num) in order {
            router.add_route(prefix, None, interface_num).unwrap();
        }

        router.route_one_datagram(datagram(ipv4("10.0.1.5"), 64));

        assert_matches!(router.interface_mut(0).pop_frame(), None);
        let frame = router.interface_mut(1).pop_frame().unwrap();
        assert_eq!(as_arp(&frame).unwrap().target_proto_addr, ipv4("10.0.1.5"));
    }
}

#[test]
fn multi_hop_forwarding_via_gateway() {
    let mut router = Router::new();
    router.add_interface(Interface::new(eth(1), ipv4("171.67.76.46")));
    router.add_interface(Interface::new(eth(2), ipv4("10.0.0.1")));
    router.add_interface(Interface::new(eth(3), ipv4("192.168.0.1")));

    router
        .add_route("0.0.0.0/0".parse().unwrap(), Some(ipv4("171.67.76.1")), 0)
        .unwrap();
    router.add_route("10.0.0.0/8".parse().unwrap(), None, 1).unwrap();
    router
        .add_route("192.168.0.0/16".parse().unwrap(), None, 2)
        .unwrap();
    router
        .add_route("172.16.0.0/12".parse().unwrap(), Some(ipv4("10.0.0.254")), 1)
        .unwrap();

    let gateway_eth = eth(0x71);
    let reply = arp_frame(
        ArpOp::Reply,
        gateway_eth,
        ipv4("171.67.76.1"),
        eth(1),
        ipv4("171.67.76.46"),
    );
    router.interface_mut(0).recv_frame(&reply);

    // Internet bound traffic from the 192.168/16 side goes to the gateway.
    let inbound = ipv4_frame(eth(0x99), eth(3), &datagram(ipv4("1.1.1.1"), 5));
    router.interface_mut(2).recv_frame(&inbound);
    // Traffic for 172.16/12 is resolved via 10.0.0.254.
    let inbound = ipv4_frame(eth(0x99), eth(3), &datagram(ipv4("172.17.0.9"), 5));
    router.interface_mut(2).recv_frame(&inbound);
    // And this one has run out of hops.
    let inbound = ipv4_frame(eth(0x99), eth(3), &datagram(ipv4("1.1.1.1"), 1));
    router.interface_mut(2).recv_frame(&inbound);

    router.route();

    let frame = router.interface_mut(0).pop_frame().unwrap();
    assert_eq!(frame.dst_addr(), gateway_eth);
    let forwarded = as_datagram(&frame).unwrap();
    assert_eq!(forwarded.header.dst_addr, ipv4("1.1.1.1"));
    assert_eq!(forwarded.header.ttl, 4);
    assert_matches!(router.interface_mut(0).pop_frame(), None);

    let frame = router.interface_mut(1).pop_frame().unwrap();
    assert_eq!(as_arp(&frame).unwrap().target_proto_addr, ipv4("10.0.0.254"));
    assert_matches!(router.interface_mut(1).pop_frame(), None);
    assert_matches!(router.interface_mut(2).pop_frame(), None);
}

#[test]
fn frames_for_other_hosts_are_not_routed() {
    let mut router = single_link_router();
    let inbound = ipv4_frame(*HOST_ETH, eth(0x42), &datagram(*HOST_IPV4, 64));
    router.interface_mut(0).recv_frame(&inbound);
    assert!(router.interface_mut(0).datagrams_in().is_empty());
}
