//! Devices move raw Ethernet frames on and off a physical or virtual link.

use std::collections::VecDeque;

use crate::{
    Error,
    Result,
};

/// A low level interface for sending and receiving Ethernet frames.
pub trait Device {
    /// Sends a frame across the link.
    fn send(&mut self, buffer: &[u8]) -> Result<()>;

    /// Reads a frame from the link into buffer and returns its size.
    ///
    /// Returns `Error::Exhausted` when no frame is pending. You should ensure
    /// the buffer has at least max_transmission_unit() bytes.
    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Returns the [MTU](https://en.wikipedia.org/wiki/Maximum_transmission_unit)
    /// of the device, including the Ethernet header.
    fn max_transmission_unit(&self) -> usize;
}

impl<D: Device + ?Sized> Device for Box<D> {
    fn send(&mut self, buffer: &[u8]) -> Result<()> {
        (**self).send(buffer)
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize> {
        (**self).recv(buffer)
    }

    fn max_transmission_unit(&self) -> usize {
        (**self).max_transmission_unit()
    }
}

/// An in memory device. Frames pushed with inject() are received, and sent
/// frames pile up until drained with take_sent().
#[derive(Debug, Default)]
pub struct Pipe {
    rx: VecDeque<Vec<u8>>,
    tx: VecDeque<Vec<u8>>,
    mtu: usize,
}

impl Pipe {
    pub fn new(mtu: usize) -> Pipe {
        Pipe {
            rx: VecDeque::new(),
            tx: VecDeque::new(),
            mtu,
        }
    }

    /// Queues a frame for a future recv(...).
    pub fn inject(&mut self, frame: Vec<u8>) {
        self.rx.push_back(frame);
    }

    /// Removes and returns the oldest sent frame.
    pub fn take_sent(&mut self) -> Option<Vec<u8>> {
        self.tx.pop_front()
    }

    pub fn sent_len(&self) -> usize {
        self.tx.len()
    }
}

impl Device for Pipe {
    fn send(&mut self, buffer: &[u8]) -> Result<()> {
        if buffer.len() > self.mtu {
            return Err(Error::Exhausted);
        }

        self.tx.push_back(buffer.to_vec());
        Ok(())
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize> {
        match self.rx.pop_front() {
            Some(ref frame) if frame.len() > buffer.len() => {
                debug!("Pipe dropping {} byte frame larger than buffer.", frame.len());
                Err(Error::Malformed)
            }
            Some(frame) => {
                buffer[.. frame.len()].copy_from_slice(&frame);
                Ok(frame.len())
            }
            None => Err(Error::Exhausted),
        }
    }

    fn max_transmission_unit(&self) -> usize {
        self.mtu
    }
}
