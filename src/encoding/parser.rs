//! Low-level byte stream parser for debug-info decoding.
//!
//! This module provides the [`crate::encoding::parser::Parser`] type, a cursor-based binary data
//! parser used for reading the location stream and the lexical-data region. It offers
//! bounds-checked access to binary data with support for signed LEB128 integers and
//! length-prefixed strings.
//!
//! # Architecture
//!
//! The parser is built around a simple cursor-based model that maintains a position within
//! a byte slice. The architecture provides:
//!
//! - **Position tracking** - Maintains current offset, which doubles as the debug offset of
//!   whatever is decoded next
//! - **Bounds checking** - All operations validate data availability before reading
//! - **Range checking** - Narrowing reads reject values outside the target type
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::encoding::parser::Parser::at`] - Create a parser positioned at an offset
//! - [`crate::encoding::parser::Parser::seek`] - Move to specific position
//! - [`crate::encoding::parser::Parser::pos`] - Get current position
//!
//! ## Data Access Methods
//! - [`crate::encoding::parser::Parser::read_u8`] - Read a single byte
//! - [`crate::encoding::parser::Parser::read_sleb128`] - Read a signed LEB128 integer
//! - [`crate::encoding::parser::Parser::read_sleb128_u32`] - Read a non-negative LEB128 `u32`
//! - [`crate::encoding::parser::Parser::read_prefixed_str`] - Read a length-prefixed UTF-8 string
//!
//! # Usage Examples
//!
//! ```rust
//! use bytecode_debuginfo::Parser;
//!
//! let data = [0x7F, 0x02, 0x01, b'x', 0x02, b'i', b'd'];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_sleb128()?, -1);
//! assert_eq!(parser.read_sleb128_u32()?, 2);
//! assert_eq!(parser.read_prefixed_str()?, "x");
//! assert_eq!(parser.read_prefixed_str()?, "id");
//! assert!(!parser.has_more_data());
//! # Ok::<(), bytecode_debuginfo::Error>(())
//! ```
//!
//! # Error Handling
//!
//! All parsing operations return [`crate::Result<T>`] and will return [`crate::Error::OutOfBounds`]
//! if there is insufficient data, or [`crate::Error::Malformed`] if an encoding is invalid
//! (over-long varints, negative lengths, values out of range, invalid UTF-8).
//!
//! # Thread Safety
//!
//! [`crate::encoding::parser::Parser`] is not [`std::marker::Send`] or [`std::marker::Sync`] due to
//! mutable state. Each thread should create its own parser instance; the underlying data can be
//! shared freely.

use crate::Result;

/// A cursor over an encoded debug-info region.
///
/// `Parser` provides a cursor-based interface for reading signed LEB128 integers and
/// length-prefixed strings. The parser maintains an internal position and provides bounds
/// checking to prevent buffer overruns when reading malformed or truncated data.
///
/// # Examples
///
/// ```rust
/// use bytecode_debuginfo::Parser;
///
/// let data = [0x05, 0xC0, 0x00, 0x41];
/// let mut parser = Parser::new(&data);
///
/// assert_eq!(parser.read_sleb128()?, 5);
/// assert_eq!(parser.read_sleb128()?, 64);
/// assert_eq!(parser.pos(), 3);
/// assert_eq!(parser.read_sleb128()?, -63);
/// # Ok::<(), bytecode_debuginfo::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::encoding::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Create a parser positioned at `pos`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is not inside the data.
    pub fn at(data: &'a [u8], pos: usize) -> Result<Self> {
        let mut parser = Parser::new(data);
        parser.seek(pos)?;
        Ok(parser)
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the current position to the specified index.
    ///
    /// # Arguments
    /// * `pos` - The position to move the cursor to
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is beyond the data length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the number of bytes left after the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Peek at the next byte without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is at or beyond the data length.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data
            .get(self.position)
            .copied()
            .ok_or(out_of_bounds_error!())
    }

    /// Read a single byte and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is at or beyond the data length.
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = self.peek_byte()?;
        self.position += 1;
        Ok(byte)
    }

    /// Read a signed LEB128 integer.
    ///
    /// Seven payload bits per byte, least significant group first; a set high bit means
    /// another byte follows. The final group is sign-extended from its bit 6.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the encoding runs past the end of the data, or
    /// [`crate::Error::Malformed`] if it does not fit in 64 bits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bytecode_debuginfo::Parser;
    ///
    /// let data = [0xC0, 0xBB, 0x78];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_sleb128()?, -123_456);
    /// # Ok::<(), bytecode_debuginfo::Error>(())
    /// ```
    pub fn read_sleb128(&mut self) -> Result<i64> {
        let start = self.position;
        let mut result = 0i64;
        let mut shift = 0u32;

        loop {
            let byte = self.read_u8()?;

            // The tenth byte only has room for bit 63; anything else must be sign padding.
            if shift == 63 && byte != 0x00 && byte != 0x7F {
                return Err(malformed_error!(
                    "Signed LEB128 at offset {} exceeds 64 bits",
                    start
                ));
            }

            result |= i64::from(byte & 0x7F) << shift;
            shift += 7;

            if (byte & 0x80) == 0 {
                if shift < 64 && (byte & 0x40) != 0 {
                    result |= -1i64 << shift;
                }
                return Ok(result);
            }
        }
    }

    /// Read a signed LEB128 integer that must fit into a `u32`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for negative values or values above `u32::MAX`,
    /// in addition to the errors of [`Parser::read_sleb128`].
    pub fn read_sleb128_u32(&mut self) -> Result<u32> {
        let start = self.position;
        let value = self.read_sleb128()?;
        u32::try_from(value).map_err(|_| {
            malformed_error!(
                "Value {} at offset {} does not fit an unsigned 32-bit field",
                value,
                start
            )
        })
    }

    /// Compute the end position of a `length` byte read, validating it against the data.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range overflows or exceeds the data.
    pub fn calc_end_position(&self, length: usize) -> Result<usize> {
        let end = self
            .position
            .checked_add(length)
            .ok_or(out_of_bounds_error!())?;

        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(end)
    }

    /// Read `length` raw bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.calc_end_position(length)?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Read a length-prefixed byte string (signed LEB128 length, then the bytes).
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a negative length and
    /// [`crate::Error::OutOfBounds`] if the string extends past the data.
    pub fn read_prefixed_bytes(&mut self) -> Result<&'a [u8]> {
        let start = self.position;
        let length = self.read_sleb128()?;
        let length = usize::try_from(length)
            .map_err(|_| malformed_error!("Invalid string length {} at offset {}", length, start))?;

        self.read_bytes(length)
    }

    /// Read a length-prefixed UTF-8 string, borrowed from the underlying data.
    ///
    /// # Errors
    /// Returns the errors of [`Parser::read_prefixed_bytes`], and [`crate::Error::Malformed`]
    /// if the bytes are not valid UTF-8.
    pub fn read_prefixed_str(&mut self) -> Result<&'a str> {
        let start = self.position;
        let bytes = self.read_prefixed_bytes()?;

        std::str::from_utf8(bytes).map_err(|e| {
            malformed_error!(
                "Invalid UTF-8 string at offset {}-{}: {}",
                start,
                self.position,
                e
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encoding::io::write_sleb128, Error};

    #[test]
    fn test_read_sleb128_single_byte() {
        let data = [0x00, 0x01, 0x3F, 0x40, 0x7F];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_sleb128().unwrap(), 0);
        assert_eq!(parser.read_sleb128().unwrap(), 1);
        assert_eq!(parser.read_sleb128().unwrap(), 63);
        assert_eq!(parser.read_sleb128().unwrap(), -64);
        assert_eq!(parser.read_sleb128().unwrap(), -1);
        assert!(!parser.has_more_data());
    }

    #[test]
    fn test_read_sleb128_multi_byte() {
        let data = [0xC0, 0x00, 0xBF, 0x7F, 0xE5, 0x8E, 0x26];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_sleb128().unwrap(), 64);
        assert_eq!(parser.pos(), 2);
        assert_eq!(parser.read_sleb128().unwrap(), -65);
        assert_eq!(parser.read_sleb128().unwrap(), 624_485);
    }

    #[test]
    fn test_read_sleb128_extremes() {
        for value in [i64::MAX, i64::MIN, i64::from(u32::MAX), -i64::from(u32::MAX)] {
            let mut buffer = Vec::new();
            write_sleb128(value, &mut buffer);
            let mut parser = Parser::new(&buffer);
            assert_eq!(parser.read_sleb128().unwrap(), value);
            assert!(!parser.has_more_data());
        }
    }

    #[test]
    fn test_read_sleb128_truncated() {
        let data = [0x80, 0x80];
        let mut parser = Parser::new(&data);
        assert!(matches!(parser.read_sleb128(), Err(Error::OutOfBounds)));
    }

    #[test]
    fn test_read_sleb128_too_long() {
        let data = [0xFF; 11];
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_sleb128(),
            Err(Error::Malformed { .. })
        ));

        // Ten bytes where the last one carries more than the sign bit
        let mut data = [0x80; 10];
        data[9] = 0x01;
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_sleb128(),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_sleb128_u32_range() {
        let mut buffer = Vec::new();
        write_sleb128(i64::from(u32::MAX), &mut buffer);
        write_sleb128(i64::from(u32::MAX) + 1, &mut buffer);
        write_sleb128(-1, &mut buffer);

        let mut parser = Parser::new(&buffer);
        assert_eq!(parser.read_sleb128_u32().unwrap(), u32::MAX);
        assert!(matches!(
            parser.read_sleb128_u32(),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            parser.read_sleb128_u32(),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_prefixed_str() {
        let data = [0x03, b'f', b'o', b'o', 0x00];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_prefixed_str().unwrap(), "foo");
        assert_eq!(parser.read_prefixed_str().unwrap(), "");
        assert!(!parser.has_more_data());
    }

    #[test]
    fn test_read_prefixed_str_negative_length() {
        let data = [0x7F, b'a'];
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_prefixed_str(),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_prefixed_str_past_end() {
        let data = [0x05, b'a', b'b'];
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_prefixed_str(),
            Err(Error::OutOfBounds)
        ));

        // A length that would overflow the address space
        let mut buffer = Vec::new();
        write_sleb128(i64::MAX, &mut buffer);
        let mut parser = Parser::new(&buffer);
        assert!(matches!(
            parser.read_prefixed_str(),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn test_read_prefixed_str_invalid_utf8() {
        let data = [0x02, 0xC3, 0x28];
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_prefixed_str(),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_seek_and_at() {
        let data = [0x01, 0x02, 0x03];
        let mut parser = Parser::at(&data, 2).unwrap();
        assert_eq!(parser.read_u8().unwrap(), 0x03);
        assert!(parser.seek(3).is_err());
        assert!(Parser::at(&data, 3).is_err());
        assert!(Parser::at(&[], 0).is_err());
    }

    #[test]
    fn test_read_bytes_and_remaining() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_bytes(3).unwrap(), &[0x01, 0x02, 0x03]);
        assert_eq!(parser.remaining(), 1);
        assert!(matches!(parser.read_bytes(2), Err(Error::OutOfBounds)));
        assert_eq!(parser.peek_byte().unwrap(), 0x04);
        assert_eq!(parser.pos(), 3);
    }
}
