use byteorder::{
    ByteOrder,
    NetworkEndian,
};

/// Calculates the Internet Checksum from [RFC1071](https://tools.ietf.org/html/rfc1071).
///
/// Summing a header which already carries its correct checksum yields zero.
pub fn internet_checksum(buffer: &[u8]) -> u16 {
    let mut acc: u32 = buffer
        .chunks(2)
        .map(|word| match word.len() {
            2 => NetworkEndian::read_u16(word) as u32,
            _ => (word[0] as u32) << 8,
        })
        .sum();

    while acc > 0xFFFF {
        acc = (acc & 0xFFFF) + (acc >> 16);
    }

    !acc as u16
}
