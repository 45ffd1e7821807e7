//! Signed LEB128 writing utilities for the debug-info encoder.
//!
//! Every integer in the location stream and in the lexical-data region is written as a
//! signed LEB128 value: seven payload bits per byte, low groups first, the high bit marking
//! continuation and bit 6 of the final byte carrying the sign. Small deltas (the common
//! case) therefore occupy a single byte regardless of sign.
//!
//! # Key Components
//!
//! - [`crate::encoding::io::write_sleb128`] - Append a signed LEB128 value to a buffer
//! - [`crate::encoding::io::sleb128_size`] - Number of bytes a value will occupy
//! - [`crate::encoding::io::write_prefixed_bytes`] - Append a length-prefixed byte string
//! - [`crate::encoding::io::delta`] - Signed difference of two unsigned coordinates
//!
//! # Examples
//!
//! ```rust
//! use bytecode_debuginfo::encoding::io::write_sleb128;
//!
//! let mut buffer = Vec::new();
//! write_sleb128(-1, &mut buffer);
//! write_sleb128(64, &mut buffer);
//! assert_eq!(buffer, [0x7F, 0xC0, 0x00]);
//! ```
//!
//! The reading counterpart lives in [`crate::encoding::parser::Parser::read_sleb128`].

/// Appends `value` to `buffer` as a signed LEB128 integer.
///
/// # Arguments
/// * `value` - The value to encode
/// * `buffer` - The output buffer, extended in place
pub fn write_sleb128(mut value: i64, buffer: &mut Vec<u8>) {
    let mut more = true;
    while more {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;

        let sign_bit = (byte & 0x40) != 0;
        if (value == 0 && !sign_bit) || (value == -1 && sign_bit) {
            more = false;
        } else {
            byte |= 0x80;
        }
        buffer.push(byte);
    }
}

/// Returns the number of bytes [`write_sleb128`] emits for `value`.
#[must_use]
pub fn sleb128_size(mut value: i64) -> usize {
    let mut size = 0;
    loop {
        let byte = value & 0x7F;
        value >>= 7;
        size += 1;

        let sign_bit = (byte & 0x40) != 0;
        if (value == 0 && !sign_bit) || (value == -1 && sign_bit) {
            return size;
        }
    }
}

/// Appends a length-prefixed byte string: the length as signed LEB128, then the raw bytes.
pub fn write_prefixed_bytes(bytes: &[u8], buffer: &mut Vec<u8>) {
    write_sleb128(bytes.len() as i64, buffer);
    buffer.extend_from_slice(bytes);
}

/// Signed difference `a - b` of two unsigned coordinates.
///
/// The result is widened to `i64` so the line delta keeps a spare bit for the statement
/// flag packed into it.
#[must_use]
pub fn delta(a: u32, b: u32) -> i64 {
    i64::from(a) - i64::from(b)
}
