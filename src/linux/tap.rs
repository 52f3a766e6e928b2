use std::io::{
    Error as IoError,
    ErrorKind,
};

use crate::core::dev::Device;
use crate::core::repr::EthernetFrame;
use crate::linux::sys;
use crate::{
    Error,
    Result,
};

/// [TAP interface](https://www.kernel.org/doc/Documentation/networking/tuntap.txt)
/// for sending and receiving raw Ethernet frames.
#[derive(Debug)]
pub struct Tap {
    fd: libc::c_int,
    max_transmission_unit: usize,
}

impl Tap {
    /// Creates or binds to an existing TAP interface with the specified name.
    ///
    /// The file descriptor is non-blocking, so recv(...) returns
    /// `Error::Exhausted` once no frames are pending.
    pub fn new(ifr_name: &str) -> Result<Tap> {
        let fd = unsafe {
            libc::open(
                "/dev/net/tun\0".as_ptr() as *const libc::c_char,
                libc::O_RDWR | libc::O_NONBLOCK,
            )
        };

        if fd < 0 {
            return Err(Error::IO(IoError::last_os_error()));
        }

        // Close the descriptor on any error from here on.
        let mut tap = Tap {
            fd,
            max_transmission_unit: 0,
        };

        let mut ifreq = sys::ifreq::with_name(ifr_name);
        ifreq.set_flags(sys::IFF_TAP | sys::IFF_NO_PI);

        if unsafe { libc::ioctl(tap.fd, sys::TUNSETIFF as _, &mut ifreq as *mut sys::ifreq) } < 0 {
            return Err(Error::IO(IoError::last_os_error()));
        }

        let ip_mtu = Tap::query_mtu(ifr_name)?;
        tap.max_transmission_unit = EthernetFrame::<&[u8]>::buffer_len(ip_mtu);

        debug!(
            "Opened TAP {} with MTU {}.",
            ifr_name, tap.max_transmission_unit
        );

        Ok(tap)
    }

    fn query_mtu(ifr_name: &str) -> Result<usize> {
        let sockfd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0) };

        if sockfd < 0 {
            return Err(Error::IO(IoError::last_os_error()));
        }

        let mut ifreq = sys::ifreq::with_name(ifr_name);
        let res = unsafe { libc::ioctl(sockfd, sys::SIOCGIFMTU as _, &mut ifreq as *mut sys::ifreq) };
        let err = IoError::last_os_error();

        unsafe {
            libc::close(sockfd);
        }

        if res < 0 {
            Err(Error::IO(err))
        } else {
            Ok(ifreq.mtu() as usize)
        }
    }
}

/// Maps a failed read/write to Exhausted when the TAP simply is not ready.
fn last_os_error() -> Error {
    let err = IoError::last_os_error();
    match err.kind() {
        ErrorKind::WouldBlock => Error::Exhausted,
        _ => Error::IO(err),
    }
}

impl Device for Tap {
    fn send(&mut self, buffer: &[u8]) -> Result<()> {
        let wrote = unsafe {
            libc::write(
                self.fd,
                buffer.as_ptr() as *const libc::c_void,
                buffer.len(),
            )
        };

        if wrote < 0 {
            Err(last_os_error())
        } else {
            Ok(())
        }
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let read = unsafe {
            libc::read(
                self.fd,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len(),
            )
        };

        if read < 0 {
            Err(last_os_error())
        } else {
            Ok(read as usize)
        }
    }

    fn max_transmission_unit(&self) -> usize {
        self.max_transmission_unit
    }
}

impl Drop for Tap {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
