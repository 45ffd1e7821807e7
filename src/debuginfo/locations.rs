//! Location stream encoding and decoding.
//!
//! The location stream maps bytecode addresses to source positions, one delta-encoded
//! record per function. It is the first region of the combined debug-info buffer.
//!
//! # Key Components
//!
//! - [`crate::debuginfo::locations::LocationDecoder`] - Incremental decoder for one function record
//! - [`crate::debuginfo::locations::FunctionRecord`] - A fully decoded function record
//! - [`crate::debuginfo::locations::FunctionRecords`] - Iterator over every record of a region
//! - [`crate::debuginfo::locations::encode_function_header`],
//!   [`crate::debuginfo::locations::encode_location_delta`],
//!   [`crate::debuginfo::locations::encode_end_of_function`] - Encoder primitives used by the builder
//!
//! # Record Format
//!
//! ```text
//! Record ::= functionIndex startLine startColumn Entry* EndOfFunction
//! Entry  ::= addressDelta packedLineDelta columnDelta statementDelta?
//! EndOfFunction ::= addressDelta(-1)
//! ```
//!
//! All fields are signed LEB128. The header values are absolute; entry fields are deltas
//! against the previous location of the same function, starting from the header location
//! with address `0` and statement `0`.
//!
//! `packedLineDelta` is `lineDelta * 2 + hasStatementDelta`. When its low bit is set a
//! `statementDelta` follows; otherwise the statement is unchanged. `lineDelta` is recovered
//! with an arithmetic shift right by one.
//!
//! An `addressDelta` of `-1` never occurs for a real entry since addresses increase within a
//! function, so it is reserved as the end-of-function marker.
//!
//! ## Example
//!
//! Function `0` starting at line 1, column 1, with locations at address 5 (line 2, column 3)
//! and address 9 (line 2, column 7):
//!
//! ```text
//! [0x00, 0x01, 0x01,  0x05, 0x02, 0x02,  0x04, 0x00, 0x04,  0x7F]
//! ```
//!
//! # Thread Safety
//!
//! Decoders borrow the region immutably; any number of decoders may run concurrently over
//! the same buffer.

use crate::{
    debuginfo::types::SourceLocation,
    encoding::{
        io::{delta, write_sleb128},
        Parser,
    },
    Result,
};

/// Address delta marking the end of a function record.
pub const END_OF_FUNCTION: i64 = -1;

/// Appends the absolute header of a function record.
pub fn encode_function_header(buffer: &mut Vec<u8>, function_index: u32, start: &SourceLocation) {
    write_sleb128(i64::from(function_index), buffer);
    write_sleb128(i64::from(start.line), buffer);
    write_sleb128(i64::from(start.column), buffer);
}

/// Appends one entry describing the step from `previous` to `next`.
///
/// # Panics
///
/// Panics if `next.address` is exactly one less than `previous.address`, since that delta
/// would read back as the end-of-function marker.
pub fn encode_location_delta(buffer: &mut Vec<u8>, previous: &SourceLocation, next: &SourceLocation) {
    let address_delta = delta(next.address, previous.address);
    let line_delta = delta(next.line, previous.line);
    let column_delta = delta(next.column, previous.column);
    let statement_delta = delta(next.statement, previous.statement);

    assert!(
        address_delta != END_OF_FUNCTION,
        "address delta of -1 collides with the end-of-function marker"
    );

    let packed_line_delta = line_delta * 2 + i64::from(statement_delta != 0);

    write_sleb128(address_delta, buffer);
    write_sleb128(packed_line_delta, buffer);
    write_sleb128(column_delta, buffer);
    if statement_delta != 0 {
        write_sleb128(statement_delta, buffer);
    }
}

/// Appends the end-of-function marker.
pub fn encode_end_of_function(buffer: &mut Vec<u8>) {
    write_sleb128(END_OF_FUNCTION, buffer);
}

fn accumulate(value: u32, delta: i64, field: &str, offset: usize) -> Result<u32> {
    i64::from(value)
        .checked_add(delta)
        .and_then(|sum| u32::try_from(sum).ok())
        .ok_or_else(|| {
            malformed_error!(
                "{} delta {} at offset {} moves {} out of range",
                field,
                delta,
                offset,
                value
            )
        })
}

/// Incremental decoder for one function record.
///
/// Construction reads the header; each call to [`LocationDecoder::next_location`] decodes
/// one entry, until the end-of-function marker is reached. The decoder also implements
/// [`Iterator`], fusing after the marker or the first error.
///
/// # Examples
///
/// ```rust
/// use bytecode_debuginfo::debuginfo::locations::LocationDecoder;
///
/// let stream = [0x00, 0x01, 0x01, 0x05, 0x02, 0x02, 0x04, 0x00, 0x04, 0x7F];
/// let mut decoder = LocationDecoder::new(&stream, 0)?;
/// assert_eq!(decoder.function_index(), 0);
/// assert_eq!(decoder.current().line, 1);
///
/// let first = decoder.next_location()?.unwrap();
/// assert_eq!((first.address, first.line, first.column), (5, 2, 3));
/// let second = decoder.next_location()?.unwrap();
/// assert_eq!((second.address, second.line, second.column), (9, 2, 7));
/// assert!(decoder.next_location()?.is_none());
/// assert_eq!(decoder.offset(), stream.len());
/// # Ok::<(), bytecode_debuginfo::Error>(())
/// ```
pub struct LocationDecoder<'a> {
    parser: Parser<'a>,
    function_index: u32,
    current: SourceLocation,
    finished: bool,
}

impl<'a> LocationDecoder<'a> {
    /// Starts decoding the function record at byte `offset` of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `offset` is outside `data` or the header is
    /// truncated, [`crate::Error::Malformed`] if a header value is out of range.
    pub fn new(data: &'a [u8], offset: usize) -> Result<Self> {
        let mut parser = Parser::at(data, offset)?;
        let function_index = parser.read_sleb128_u32()?;
        let line = parser.read_sleb128_u32()?;
        let column = parser.read_sleb128_u32()?;

        Ok(LocationDecoder {
            parser,
            function_index,
            current: SourceLocation {
                line,
                column,
                ..SourceLocation::default()
            },
            finished: false,
        })
    }

    /// Index of the function this record belongs to.
    #[must_use]
    pub fn function_index(&self) -> u32 {
        self.function_index
    }

    /// The most recently decoded location, or the header location before the first entry.
    ///
    /// `filename_id` and `source_mapping_url_id` are not part of the stream and stay `0`.
    #[must_use]
    pub fn current(&self) -> &SourceLocation {
        &self.current
    }

    /// Byte offset of the next unread entry. Once the record is finished this is the offset
    /// of the following function record.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.parser.pos()
    }

    /// Returns `true` once the end-of-function marker has been consumed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Decodes the next entry.
    ///
    /// Returns `Ok(None)` when the end-of-function marker is read; the marker is consumed
    /// exactly once and later calls keep returning `Ok(None)`.
    ///
    /// # Errors
    /// Returns an error if the entry is truncated or moves a coordinate out of the `u32`
    /// range.
    pub fn next_location(&mut self) -> Result<Option<SourceLocation>> {
        if self.finished {
            return Ok(None);
        }

        let entry_offset = self.parser.pos();
        let address_delta = self.parser.read_sleb128()?;
        if address_delta == END_OF_FUNCTION {
            self.finished = true;
            return Ok(None);
        }

        let packed_line_delta = self.parser.read_sleb128()?;
        let column_delta = self.parser.read_sleb128()?;
        let statement_delta = if packed_line_delta & 1 != 0 {
            self.parser.read_sleb128()?
        } else {
            0
        };
        let line_delta = packed_line_delta >> 1;

        let current = &mut self.current;
        current.address = accumulate(current.address, address_delta, "address", entry_offset)?;
        current.line = accumulate(current.line, line_delta, "line", entry_offset)?;
        current.column = accumulate(current.column, column_delta, "column", entry_offset)?;
        current.statement =
            accumulate(current.statement, statement_delta, "statement", entry_offset)?;

        Ok(Some(*current))
    }

    /// Consumes the remaining entries and returns the offset just past the record.
    ///
    /// # Errors
    /// Returns the first decoding error encountered.
    pub fn skip_to_end(&mut self) -> Result<usize> {
        while self.next_location()?.is_some() {}
        Ok(self.offset())
    }
}

impl Iterator for LocationDecoder<'_> {
    type Item = Result<SourceLocation>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_location() {
            Ok(Some(location)) => Some(Ok(location)),
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// A fully decoded function record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    /// Byte offset of the record header.
    pub offset: usize,
    /// Index of the function.
    pub function_index: u32,
    /// Header location (address `0`).
    pub start: SourceLocation,
    /// Every entry as `(entry byte offset, decoded location)`, in encoding order.
    pub locations: Vec<(usize, SourceLocation)>,
    /// Byte offset just past the end-of-function marker.
    pub end_offset: usize,
}

impl FunctionRecord {
    /// Decodes the whole record at `offset`.
    ///
    /// # Errors
    /// Returns the errors of [`LocationDecoder`].
    pub fn decode(data: &[u8], offset: usize) -> Result<FunctionRecord> {
        let mut decoder = LocationDecoder::new(data, offset)?;
        let start = *decoder.current();
        let mut locations = Vec::new();

        loop {
            let entry_offset = decoder.offset();
            match decoder.next_location()? {
                Some(location) => locations.push((entry_offset, location)),
                None => break,
            }
        }

        Ok(FunctionRecord {
            offset,
            function_index: decoder.function_index(),
            start,
            locations,
            end_offset: decoder.offset(),
        })
    }

    /// Header location followed by every entry, each paired with the byte offset of the
    /// record part that produced it.
    pub fn all_locations(&self) -> impl Iterator<Item = (usize, &SourceLocation)> + '_ {
        std::iter::once((self.offset, &self.start))
            .chain(self.locations.iter().map(|(offset, loc)| (*offset, loc)))
    }
}

/// Iterator over every function record of a location-stream region, in encoding order.
///
/// Each record starts where the previous one finished. Iteration fuses on the first error.
pub struct FunctionRecords<'a> {
    data: &'a [u8],
    position: usize,
    failed: bool,
}

impl<'a> FunctionRecords<'a> {
    /// Creates an iterator over the location-stream region `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        FunctionRecords {
            data,
            position: 0,
            failed: false,
        }
    }
}

impl Iterator for FunctionRecords<'_> {
    type Item = Result<FunctionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.position >= self.data.len() {
            return None;
        }

        match FunctionRecord::decode(self.data, self.position) {
            Ok(record) => {
                self.position = record.end_offset;
                Some(Ok(record))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
