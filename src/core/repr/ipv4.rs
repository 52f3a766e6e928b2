use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};
use std::result::Result as StdResult;
use std::str::FromStr;

use byteorder::{
    ByteOrder,
    NetworkEndian,
};

use crate::core::check::internet_checksum;
use crate::{
    Error,
    Result,
};

/// [IPv4 address](https://en.wikipedia.org/wiki/IPv4) in network byte order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 4]);

impl Address {
    pub const UNSPECIFIED: Address = Address([0; 4]);

    /// Creates an IPv4 address from a network byte order buffer.
    pub const fn new(addr: [u8; 4]) -> Address {
        Address(addr)
    }

    /// Tries to create an IPv4 address from a network byte order slice.
    pub fn try_new(addr: &[u8]) -> Result<Address> {
        if addr.len() != 4 {
            return Err(Error::Exhausted);
        }

        let mut bytes = [0; 4];
        bytes.copy_from_slice(addr);
        Ok(Address(bytes))
    }

    /// Returns a reference to the network byte order representation of the
    /// address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the address as a host order integer, e.g. 10.0.0.1 is 0x0A000001.
    pub fn as_u32(&self) -> u32 {
        NetworkEndian::read_u32(&self.0)
    }
}

impl From<u32> for Address {
    fn from(addr: u32) -> Address {
        let mut bytes = [0; 4];
        NetworkEndian::write_u32(&mut bytes, addr);
        Address(bytes)
    }
}

impl From<Address> for u32 {
    fn from(addr: Address) -> u32 {
        addr.as_u32()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

impl FromStr for Address {
    type Err = ();

    /// Parses an IPv4 address from an A.B.C.D style string.
    fn from_str(addr: &str) -> StdResult<Address, Self::Err> {
        let bytes = addr
            .split('.')
            .map(|token| token.parse::<u8>())
            .collect::<StdResult<Vec<_>, _>>()
            .map_err(|_| ())?;

        Address::try_new(&bytes).map_err(|_| ())
    }
}

/// An IPv4 address (or route prefix) with a subnet length, e.g. 10.0.0.0/8.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AddressCidr {
    addr: Address,
    subnet_len: u8,
}

impl AddressCidr {
    /// Creates a CIDR address.
    ///
    /// # Panics
    ///
    /// Causes a panic if subnet_len is larger than 32 bits.
    pub fn new(addr: Address, subnet_len: u8) -> AddressCidr {
        match AddressCidr::try_new(addr, subnet_len) {
            Ok(cidr) => cidr,
            Err(_) => panic!("Subnet length {} exceeds 32 bits.", subnet_len),
        }
    }

    /// Tries to create a CIDR address, failing if subnet_len exceeds 32 bits.
    pub fn try_new(addr: Address, subnet_len: u8) -> Result<AddressCidr> {
        if subnet_len > 32 {
            return Err(Error::Malformed);
        }

        Ok(AddressCidr { addr, subnet_len })
    }

    pub fn addr(&self) -> Address {
        self.addr
    }

    pub fn subnet_len(&self) -> u8 {
        self.subnet_len
    }

    /// Returns the subnet mask as a host order integer.
    pub fn netmask(&self) -> u32 {
        match self.subnet_len {
            0 => 0,
            len => 0xFFFF_FFFF << (32 - len as u32),
        }
    }

    /// Checks if an address shares the leading subnet_len bits with this one.
    pub fn is_member(&self, addr: Address) -> bool {
        let mask = self.netmask();
        (self.addr.as_u32() & mask) == (addr.as_u32() & mask)
    }
}

impl Display for AddressCidr {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}/{}", self.addr, self.subnet_len)
    }
}

impl FromStr for AddressCidr {
    type Err = ();

    /// Parses a CIDR address from an A.B.C.D/N style string.
    fn from_str(cidr: &str) -> StdResult<AddressCidr, Self::Err> {
        let mut tokens = cidr.splitn(2, '/');
        let addr = tokens.next().ok_or(())?.parse::<Address>()?;
        let subnet_len = tokens
            .next()
            .ok_or(())?
            .parse::<u8>()
            .map_err(|_| ())?;

        AddressCidr::try_new(addr, subnet_len).map_err(|_| ())
    }
}

/// https://www.iana.org/assignments/protocol-numbers/protocol-numbers.xhtml
pub mod protocols {
    pub const ICMP: u8 = 1;

    pub const TCP: u8 = 6;

    pub const UDP: u8 = 17;
}

mod fields {
    use std::ops::Range;

    pub const VERSION_IHL: usize = 0;

    pub const TOS: usize = 1;

    pub const PACKET_LEN: Range<usize> = 2 .. 4;

    pub const IDENTIFICATION: Range<usize> = 4 .. 6;

    pub const FLAGS_FRAGMENT: Range<usize> = 6 .. 8;

    pub const TTL: usize = 8;

    pub const PROTOCOL: usize = 9;

    pub const CHECKSUM: Range<usize> = 10 .. 12;

    pub const SRC_ADDR: Range<usize> = 12 .. 16;

    pub const DST_ADDR: Range<usize> = 16 .. 20;
}

/// View of a byte buffer as an IPv4 packet.
#[derive(Debug)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> AsRef<[u8]> for Packet<T> {
    fn as_ref(&self) -> &[u8] {
        self.buffer.as_ref()
    }
}

impl<T: AsRef<[u8]>> Packet<T> {
    pub const MIN_HEADER_LEN: usize = 20;

    /// Tries to create an IPv4 packet view over a byte buffer.
    ///
    /// Only the minimum header length is checked here, use check_encoding()
    /// to validate the header contents.
    pub fn try_new(buffer: T) -> Result<Packet<T>> {
        if buffer.as_ref().len() < Self::MIN_HEADER_LEN {
            Err(Error::Exhausted)
        } else {
            Ok(Packet { buffer })
        }
    }

    /// Checks the version, lengths and header checksum of the packet.
    pub fn check_encoding(&self) -> Result<()> {
        let buffer_len = self.buffer.as_ref().len();
        let header_len = self.header_len() as usize;

        if self.ip_version() != 4 {
            Err(Error::Malformed)
        } else if header_len < Self::MIN_HEADER_LEN
            || header_len > self.packet_len() as usize
            || self.packet_len() as usize > buffer_len
        {
            Err(Error::Malformed)
        } else if internet_checksum(&self.buffer.as_ref()[.. header_len]) != 0 {
            Err(Error::Checksum)
        } else {
            Ok(())
        }
    }

    /// Returns the length of an IPv4 packet with no options and the payload size.
    pub fn buffer_len(payload_len: usize) -> usize {
        Self::MIN_HEADER_LEN + payload_len
    }

    pub fn ip_version(&self) -> u8 {
        self.buffer.as_ref()[fields::VERSION_IHL] >> 4
    }

    pub fn header_len(&self) -> u8 {
        (self.buffer.as_ref()[fields::VERSION_IHL] & 0x0F) * 4
    }

    pub fn tos(&self) -> u8 {
        self.buffer.as_ref()[fields::TOS]
    }

    pub fn packet_len(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[fields::PACKET_LEN])
    }

    pub fn identification(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[fields::IDENTIFICATION])
    }

    /// Returns the flags (upper 3 bits) and fragment offset (lower 13 bits).
    pub fn flags_fragment(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[fields::FLAGS_FRAGMENT])
    }

    pub fn ttl(&self) -> u8 {
        self.buffer.as_ref()[fields::TTL]
    }

    pub fn protocol(&self) -> u8 {
        self.buffer.as_ref()[fields::PROTOCOL]
    }

    pub fn header_checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[fields::CHECKSUM])
    }

    pub fn src_addr(&self) -> Address {
        let mut addr = [0; 4];
        addr.copy_from_slice(&self.buffer.as_ref()[fields::SRC_ADDR]);
        Address(addr)
    }

    pub fn dst_addr(&self) -> Address {
        let mut addr = [0; 4];
        addr.copy_from_slice(&self.buffer.as_ref()[fields::DST_ADDR]);
        Address(addr)
    }

    /// Returns the header options, if any.
    pub fn options(&self) -> &[u8] {
        &self.buffer.as_ref()[Self::MIN_HEADER_LEN .. self.header_len() as usize]
    }

    /// Returns the payload, excluding any link layer padding past packet_len().
    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[self.header_len() as usize .. self.packet_len() as usize]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    pub fn set_version_and_header_len(&mut self, header_len: u8) {
        self.buffer.as_mut()[fields::VERSION_IHL] = (4 << 4) | (header_len / 4);
    }

    pub fn set_tos(&mut self, tos: u8) {
        self.buffer.as_mut()[fields::TOS] = tos;
    }

    pub fn set_packet_len(&mut self, packet_len: u16) {
        NetworkEndian::write_u16(&mut self.buffer.as_mut()[fields::PACKET_LEN], packet_len);
    }

    pub fn set_identification(&mut self, identification: u16) {
        NetworkEndian::write_u16(
            &mut self.buffer.as_mut()[fields::IDENTIFICATION],
            identification,
        );
    }

    pub fn set_flags_fragment(&mut self, flags_fragment: u16) {
        NetworkEndian::write_u16(
            &mut self.buffer.as_mut()[fields::FLAGS_FRAGMENT],
            flags_fragment,
        );
    }

    pub fn set_ttl(&mut self, ttl: u8) {
        self.buffer.as_mut()[fields::TTL] = ttl;
    }

    pub fn set_protocol(&mut self, protocol: u8) {
        self.buffer.as_mut()[fields::PROTOCOL] = protocol;
    }

    pub fn set_header_checksum(&mut self, checksum: u16) {
        NetworkEndian::write_u16(&mut self.buffer.as_mut()[fields::CHECKSUM], checksum);
    }

    pub fn set_src_addr(&mut self, addr: Address) {
        self.buffer.as_mut()[fields::SRC_ADDR].copy_from_slice(addr.as_bytes());
    }

    pub fn set_dst_addr(&mut self, addr: Address) {
        self.buffer.as_mut()[fields::DST_ADDR].copy_from_slice(addr.as_bytes());
    }

    /// Recomputes and writes the header checksum.
    pub fn fill_checksum(&mut self) {
        self.set_header_checksum(0);
        let header_len = self.header_len() as usize;
        let checksum = internet_checksum(&self.buffer.as_ref()[.. header_len]);
        self.set_header_checksum(checksum);
    }

    pub fn options_mut(&mut self) -> &mut [u8] {
        let header_len = self.header_len() as usize;
        &mut self.buffer.as_mut()[Self::MIN_HEADER_LEN .. header_len]
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        let (header_len, packet_len) = (self.header_len() as usize, self.packet_len() as usize);
        &mut self.buffer.as_mut()[header_len .. packet_len]
    }
}

/// Owned representation of an IPv4 header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Repr {
    pub tos: u8,
    pub identification: u16,
    pub flags_fragment: u16,
    pub ttl: u8,
    pub protocol: u8,
    /// Checksum as last parsed. Zero means invalidated; serialization always
    /// writes a freshly computed checksum.
    pub checksum: u16,
    pub src_addr: Address,
    pub dst_addr: Address,
    /// Raw option bytes, a multiple of 4 bytes long.
    pub options: Vec<u8>,
}

impl Default for Repr {
    fn default() -> Repr {
        Repr {
            tos: 0,
            identification: 0,
            flags_fragment: 0,
            ttl: 64,
            protocol: 0,
            checksum: 0,
            src_addr: Address::UNSPECIFIED,
            dst_addr: Address::UNSPECIFIED,
            options: Vec::new(),
        }
    }
}

impl Repr {
    /// Returns the length of the serialized header, options included.
    pub fn header_len(&self) -> usize {
        Packet::<&[u8]>::MIN_HEADER_LEN + self.options.len()
    }
}

/// An IPv4 datagram that owns its header and payload.
///
/// This is the unit moved between interface and router queues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Datagram {
    pub header: Repr,
    pub payload: Vec<u8>,
}

impl Datagram {
    /// Parses and validates a datagram from a byte buffer.
    pub fn parse(buffer: &[u8]) -> Result<Datagram> {
        let packet = Packet::try_new(buffer)?;
        packet.check_encoding()?;

        Ok(Datagram {
            header: Repr {
                tos: packet.tos(),
                identification: packet.identification(),
                flags_fragment: packet.flags_fragment(),
                ttl: packet.ttl(),
                protocol: packet.protocol(),
                checksum: packet.header_checksum(),
                src_addr: packet.src_addr(),
                dst_addr: packet.dst_addr(),
                options: packet.options().to_vec(),
            },
            payload: packet.payload().to_vec(),
        })
    }

    /// Returns the serialized length of the datagram.
    pub fn buffer_len(&self) -> usize {
        self.header.header_len() + self.payload.len()
    }

    /// Serializes the datagram into a buffer, recomputing the header checksum.
    ///
    /// Fails if the buffer is too small, the datagram exceeds 65535 bytes or
    /// the options are not a multiple of 4 bytes (at most 40).
    pub fn serialize(&self, buffer: &mut [u8]) -> Result<()> {
        let (header_len, buffer_len) = (self.header.header_len(), self.buffer_len());

        if self.header.options.len() % 4 != 0 || self.header.options.len() > 40 {
            return Err(Error::Malformed);
        } else if buffer_len > u16::max_value() as usize || buffer.len() < buffer_len {
            return Err(Error::Exhausted);
        }

        let mut packet = Packet::try_new(&mut buffer[.. buffer_len])?;
        packet.set_version_and_header_len(header_len as u8);
        packet.set_tos(self.header.tos);
        packet.set_packet_len(buffer_len as u16);
        packet.set_identification(self.header.identification);
        packet.set_flags_fragment(self.header.flags_fragment);
        packet.set_ttl(self.header.ttl);
        packet.set_protocol(self.header.protocol);
        packet.set_src_addr(self.header.src_addr);
        packet.set_dst_addr(self.header.dst_addr);
        packet.options_mut().copy_from_slice(&self.header.options);
        packet.payload_mut().copy_from_slice(&self.payload);
        packet.fill_checksum();

        Ok(())
    }

    /// Serializes the datagram into a new buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = vec![0; self.buffer_len()];
        self.serialize(&mut buffer)?;
        Ok(buffer)
    }
}
