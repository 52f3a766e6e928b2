use std::collections::HashMap;

use crate::core::repr::Ipv4Address;

/// Default window during which repeat ARP requests are suppressed.
pub const DEFAULT_WINDOW_MS: u64 = 5_000;

/// Tracks addresses that were recently asked about, to avoid request storms.
#[derive(Clone, Debug)]
pub struct Cooldown {
    remaining: HashMap<Ipv4Address, u64>,
    window_ms: u64,
}

impl Cooldown {
    pub fn new(window_ms: u64) -> Cooldown {
        Cooldown {
            remaining: HashMap::new(),
            window_ms,
        }
    }

    /// Checks if a request for the address is still being suppressed.
    pub fn is_active(&self, ipv4_addr: Ipv4Address) -> bool {
        self.remaining
            .get(&ipv4_addr)
            .map_or(false, |remaining| *remaining > 0)
    }

    /// Starts a full window for the address.
    pub fn arm(&mut self, ipv4_addr: Ipv4Address) {
        self.remaining.insert(ipv4_addr, self.window_ms);
    }

    /// Advances every window by elapsed_ms. Windows that run out are dropped.
    pub fn tick(&mut self, elapsed_ms: u64) {
        for remaining in self.remaining.values_mut() {
            *remaining = remaining.saturating_sub(elapsed_ms);
        }

        self.remaining.retain(|_, remaining| *remaining > 0);
    }
}

impl Default for Cooldown {
    fn default() -> Cooldown {
        Cooldown::new(DEFAULT_WINDOW_MS)
    }
}
