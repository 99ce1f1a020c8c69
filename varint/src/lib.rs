//! Variable length integer encoding used in canonical transaction blobs
//!
//! Each byte carries 7 bits of the value, least significant group first. The high bit
//! is set on every byte except the last.

/// Maximum number of bytes a `u64` can occupy once encoded
pub const MAX_ENCODED_LEN: usize = 10;

pub fn serialize(mut n: u64) -> Vec<u8> {
    let mut vec = Vec::new();

    while n > 127 {
        vec.push(128 | (n & 127) as u8);
        n >>= 7;
    }

    vec.push(n as u8);

    vec
}

/// Reads a varint from the start of `bytes`
///
/// Returns the value along with the number of bytes consumed, or `None` if the input
/// ends before the terminating byte or the value does not fit in a `u64`
pub fn deserialize(bytes: &[u8]) -> Option<(u64, usize)> {
    let mut n: u64 = 0;
    let mut shift = 0;

    for (i, byte) in bytes.iter().enumerate().take(MAX_ENCODED_LEN) {
        let group = u64::from(byte & 127);
        if shift == 63 && group > 1 {
            return None;
        }
        n |= group << shift;
        shift += 7;

        if *byte < 128 {
            return Some((n, i + 1));
        }
    }

    None
}
