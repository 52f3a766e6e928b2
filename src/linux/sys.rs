//! Bits of the Linux TUN/TAP and netdevice ABI not exported by libc.

pub const IFF_TAP: libc::c_short = 0x0002;

pub const IFF_NO_PI: libc::c_short = 0x1000;

pub const TUNSETIFF: libc::c_ulong = 0x4004_54CA;

pub const SIOCGIFMTU: libc::c_ulong = 0x8921;

/// [https://linux.die.net/man/7/netdevice](https://linux.die.net/man/7/netdevice)
///
/// The ifr_ifru union is kept as raw bytes, only its flags and MTU members
/// are ever touched.
#[allow(non_camel_case_types)]
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ifreq {
    pub ifr_name: [libc::c_char; libc::IF_NAMESIZE],
    pub ifr_ifru: [u8; 24],
}

impl ifreq {
    /// Creates a request for the named interface.
    ///
    /// The name is truncated to leave room for a terminating NUL.
    pub fn with_name(ifr_name: &str) -> ifreq {
        let mut ifreq = ifreq {
            ifr_name: [0; libc::IF_NAMESIZE],
            ifr_ifru: [0; 24],
        };

        for (i, c) in ifr_name.bytes().take(libc::IF_NAMESIZE - 1).enumerate() {
            ifreq.ifr_name[i] = c as libc::c_char;
        }

        ifreq
    }

    pub fn set_flags(&mut self, flags: libc::c_short) {
        self.ifr_ifru[.. 2].copy_from_slice(&flags.to_ne_bytes());
    }

    pub fn mtu(&self) -> libc::c_int {
        let mut mtu = [0; 4];
        mtu.copy_from_slice(&self.ifr_ifru[.. 4]);
        libc::c_int::from_ne_bytes(mtu)
    }
}
