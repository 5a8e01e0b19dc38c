//! UEFI additive checksums.
//!
//! Firmware structures are valid when the sum of their bytes (or 16-bit
//! words) is zero modulo the word size. The stored checksum field is the
//! two's complement of the sum of everything else.

/// Wrapping 8-bit sum of `data`.
pub fn checksum8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Wrapping sum of little-endian 16-bit words. A trailing odd byte is
/// treated as the low half of a final word.
pub fn checksum16(data: &[u8]) -> u16 {
    data.chunks(2).fold(0u16, |acc, w| {
        let word = match w {
            [lo, hi] => u16::from_le_bytes([*lo, *hi]),
            [lo] => u16::from(*lo),
            _ => 0,
        };
        acc.wrapping_add(word)
    })
}

/// The value that makes `checksum8(data) + value == 0`.
pub fn complement8(data: &[u8]) -> u8 {
    0u8.wrapping_sub(checksum8(data))
}
