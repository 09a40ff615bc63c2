//! Decoding of the fixed-width numeric fields of a tar header.
//!
//! Decoding never fails. Readers in the wild pad these fields with NUL or
//! space in inconsistent ways, so anything that does not parse reads as zero.

/// Decode an ASCII-octal field, reading at most `max_len` bytes and stopping
/// at the first byte that is not an ASCII digit.
pub fn decode(field: &[u8], max_len: usize) -> u64 {
    field
        .iter()
        .take(max_len)
        .take_while(|b| b.is_ascii_digit())
        .fold(0u64, |acc, b| {
            acc.wrapping_mul(8).wrapping_add(u64::from(b - b'0'))
        })
}

/// Decode a numeric field that may use the GNU base-256 extension, where the
/// high bit of the first byte marks a big-endian binary value.
pub fn decode_numeric(field: &[u8]) -> u64 {
    match field.split_first() {
        Some((first, rest)) if first & 0x80 != 0 => rest
            .iter()
            .fold(u64::from(first & 0x7f), |acc, b| {
                (acc << 8) | u64::from(*b)
            }),
        _ => decode(field, field.len()),
    }
}
