//! Forwards IPv4 between several Linux TAP interfaces using static routes.
//!
//! ```text
//! static_router --interface tap0,02:00:00:00:00:01,10.0.0.1 \
//!     --interface tap1,02:00:00:00:00:02,10.0.1.1 \
//!     --route 10.0.0.0/24=0 --route 0.0.0.0/0@10.0.1.254=1
//! ```

use std::process;
use std::thread;
use std::time::{
    Duration,
    Instant,
};

use clap::{
    App,
    Arg,
};

use fwdnet::core::repr::{
    EthernetAddress,
    Ipv4Address,
    Ipv4AddressCidr,
};

/// A `TAP,MAC,IPV4` interface argument.
struct InterfaceArg {
    tap: String,
    ethernet_addr: EthernetAddress,
    ipv4_addr: Ipv4Address,
}

/// A `PREFIX/LEN[@NEXT_HOP]=INTERFACE` route argument.
struct RouteArg {
    prefix: Ipv4AddressCidr,
    next_hop: Option<Ipv4Address>,
    interface_num: usize,
}

fn parse_interface(arg: &str) -> Result<InterfaceArg, String> {
    let tokens: Vec<_> = arg.split(',').collect();
    if tokens.len() != 3 {
        return Err(format!("Expected TAP,MAC,IPV4 but got {}.", arg));
    }

    Ok(InterfaceArg {
        tap: tokens[0].to_string(),
        ethernet_addr: tokens[1]
            .parse()
            .map_err(|_| format!("Invalid MAC address {}.", tokens[1]))?,
        ipv4_addr: tokens[2]
            .parse()
            .map_err(|_| format!("Invalid IPv4 address {}.", tokens[2]))?,
    })
}

fn parse_route(arg: &str) -> Result<RouteArg, String> {
    let mut tokens = arg.splitn(2, '=');
    let (dst, interface_num) = match (tokens.next(), tokens.next()) {
        (Some(dst), Some(interface_num)) => (dst, interface_num),
        _ => return Err(format!("Expected PREFIX/LEN[@NEXT_HOP]=INTERFACE but got {}.", arg)),
    };

    let mut tokens = dst.splitn(2, '@');
    let prefix = tokens.next().unwrap_or("");

    Ok(RouteArg {
        prefix: prefix
            .parse()
            .map_err(|_| format!("Invalid route prefix {}.", prefix))?,
        next_hop: match tokens.next() {
            Some(next_hop) => Some(
                next_hop
                    .parse()
                    .map_err(|_| format!("Invalid next hop {}.", next_hop))?,
            ),
            None => None,
        },
        interface_num: interface_num
            .parse()
            .map_err(|_| format!("Invalid interface index {}.", interface_num))?,
    })
}

fn validate<F, T>(f: F) -> impl Fn(String) -> Result<(), String>
where
    F: Fn(&str) -> Result<T, String>,
{
    move |arg| f(&arg).map(|_| ())
}

#[cfg(target_os = "linux")]
fn run(interfaces: Vec<InterfaceArg>, routes: Vec<RouteArg>, tick: Duration) -> fwdnet::Result<()> {
    use fwdnet::core::router::{
        poll,
        Router,
    };
    use fwdnet::core::service::Interface;
    use fwdnet::linux::Tap;

    let mut router = Router::new();
    let mut devices = Vec::new();

    for interface in interfaces {
        devices.push(Tap::new(&interface.tap)?);
        router.add_interface(Interface::new(interface.ethernet_addr, interface.ipv4_addr));
    }

    for route in routes {
        router.add_route(route.prefix, route.next_hop, route.interface_num)?;
    }

    let mut last_tick = Instant::now();

    loop {
        let now = Instant::now();
        let elapsed = now.duration_since(last_tick);
        last_tick = now;

        let elapsed_ms = elapsed.as_secs() * 1_000 + elapsed.subsec_millis() as u64;
        poll(&mut router, &mut devices, elapsed_ms);

        thread::sleep(tick);
    }
}

#[cfg(not(target_os = "linux"))]
fn run(_: Vec<InterfaceArg>, _: Vec<RouteArg>, _: Duration) -> fwdnet::Result<()> {
    eprintln!("TAP devices are only supported on Linux.");
    Ok(())
}

fn main() {
    env_logger::init();

    let matches = App::new("static_router")
        .about("Forwards IPv4 datagrams between TAP interfaces")
        .arg(
            Arg::with_name("interface")
                .long("interface")
                .value_name("TAP,MAC,IPV4")
                .help("Interface to attach, in order of index")
                .multiple(true)
                .number_of_values(1)
                .required(true)
                .takes_value(true)
                .validator(validate(parse_interface)),
        )
        .arg(
            Arg::with_name("route")
                .long("route")
                .value_name("PREFIX/LEN[@NEXT_HOP]=INTERFACE")
                .help("Static route to install")
                .multiple(true)
                .number_of_values(1)
                .takes_value(true)
                .validator(validate(parse_route)),
        )
        .arg(
            Arg::with_name("tick-ms")
                .long("tick-ms")
                .value_name("MS")
                .help("Milliseconds between polls")
                .default_value("10")
                .takes_value(true),
        )
        .get_matches();

    // Values were checked by the validators above.
    let interfaces = matches
        .values_of("interface")
        .into_iter()
        .flatten()
        .filter_map(|arg| parse_interface(arg).ok())
        .collect();
    let routes = matches
        .values_of("route")
        .into_iter()
        .flatten()
        .filter_map(|arg| parse_route(arg).ok())
        .collect();
    let tick = match matches.value_of("tick-ms").unwrap_or("10").parse() {
        Ok(tick_ms) => Duration::from_millis(tick_ms),
        Err(_) => {
            eprintln!("Invalid --tick-ms.");
            process::exit(1);
        }
    };

    if let Err(err) = run(interfaces, routes, tick) {
        eprintln!("Router failed with {:?}.", err);
        process::exit(1);
    }
}
