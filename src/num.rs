//! Script number encoding
//!
//! Numbers on the stack are little-endian sign-magnitude: the high bit of
//! the last byte carries the sign and zero is the empty byte string.

use crate::types::*;

pub fn encode_num(num: i64) -> ByteString {
    if num == 0 {
        return Vec::new();
    }
    let negative = num < 0;
    let mut abs = num.unsigned_abs();
    let mut result = Vec::with_capacity(9);
    while abs > 0 {
        result.push((abs & 0xff) as u8);
        abs >>= 8;
    }
    // The sign bit needs a byte of its own when the magnitude already uses it
    let last = result.len() - 1;
    if result[last] & 0x80 != 0 {
        result.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        result[last] |= 0x80;
    }
    result
}

/// Inverse of [`encode_num`]. Inputs longer than 8 bytes keep only their
/// low 64 bits of magnitude.
pub fn decode_num(element: &[u8]) -> i64 {
    let last = match element.last() {
        Some(b) => *b,
        None => return 0,
    };
    let negative = last & 0x80 != 0;
    let mut result: i64 = 0;
    for (i, byte) in element.iter().enumerate().take(8) {
        let byte = if i == element.len() - 1 { byte & 0x7f } else { *byte };
        result |= (byte as i64) << (8 * i);
    }
    if negative {
        result.wrapping_neg()
    } else {
        result
    }
}

/// Truthiness of a stack element: anything but zero or negative zero
pub fn is_true(element: &[u8]) -> bool {
    for (i, byte) in element.iter().enumerate() {
        if *byte != 0 {
            // Negative zero
            if i == element.len() - 1 && *byte == 0x80 {
                return false;
            }
            return true;
        }
    }
    false
}
