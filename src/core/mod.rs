//! Core, platform independent forwarding code.

pub mod arp_cache;
pub mod check;
pub mod cooldown;
pub mod dev;
pub mod repr;
pub mod route;
pub mod router;
pub mod service;
