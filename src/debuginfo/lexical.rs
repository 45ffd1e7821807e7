//! Lexical scope records.
//!
//! Each record names the variables of one lexical scope and the function whose scope
//! encloses it. Records live in the second region of the combined buffer and are addressed
//! by their byte offset inside that region.
//!
//! # Record Format
//!
//! ```text
//! Record ::= parentFunctionId nameCount Name{nameCount}
//! Name   ::= length byte{length}
//! ```
//!
//! All integers are signed LEB128. A negative `parentFunctionId` means the scope has no
//! parent. The record `{-1, 0}` (bytes `7F 00`) always sits at offset
//! [`EMPTY_LEXICAL_DATA_OFFSET`] and is shared by every scope without parent or names.

use crate::{
    encoding::{
        io::{write_prefixed_bytes, write_sleb128},
        Parser,
    },
    Result,
};

/// Offset of the shared empty record inside the lexical region.
pub const EMPTY_LEXICAL_DATA_OFFSET: u32 = 0;

/// Appends one lexical record to `buffer`.
pub fn write_lexical_record<S: AsRef<str>>(
    buffer: &mut Vec<u8>,
    parent_function_id: Option<u32>,
    names: &[S],
) {
    write_sleb128(parent_function_id.map_or(-1, i64::from), buffer);
    write_sleb128(names.len() as i64, buffer);
    for name in names {
        write_prefixed_bytes(name.as_ref().as_bytes(), buffer);
    }
}

fn read_parent(parser: &mut Parser<'_>) -> Result<Option<u32>> {
    let start = parser.pos();
    let parent = parser.read_sleb128()?;
    if parent < 0 {
        return Ok(None);
    }

    u32::try_from(parent).map(Some).map_err(|_| {
        malformed_error!(
            "Parent function id {} at lexical offset {} exceeds 32 bits",
            parent,
            start
        )
    })
}

fn read_count(parser: &mut Parser<'_>) -> Result<usize> {
    let start = parser.pos();
    let count = parser.read_sleb128()?;

    // Every name takes at least its length byte
    match usize::try_from(count) {
        Ok(count) if count <= parser.remaining() => Ok(count),
        _ => Err(malformed_error!(
            "Invalid name count {} at lexical offset {}",
            count,
            start
        )),
    }
}

/// A decoded lexical scope record, borrowing its names from the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalRecord<'a> {
    /// Byte offset of the record inside the lexical region.
    pub offset: u32,
    /// Function whose scope encloses this one.
    pub parent_function_id: Option<u32>,
    /// Variable names, in declaration order.
    pub names: Vec<&'a str>,
    /// Offset of each name's length prefix inside the lexical region.
    pub name_offsets: Vec<u32>,
}

impl<'a> LexicalRecord<'a> {
    /// Decodes the record at `offset` of the lexical region `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the record is outside or runs past `data`, and
    /// [`crate::Error::Malformed`] for a parent id beyond 32 bits, an impossible name count, a
    /// negative name length or a name that is not UTF-8.
    pub fn decode(data: &'a [u8], offset: u32) -> Result<Self> {
        let mut parser = Parser::at(data, offset as usize)?;
        Self::read(&mut parser)
    }

    fn read(parser: &mut Parser<'a>) -> Result<Self> {
        let offset = u32::try_from(parser.pos()).map_err(|_| out_of_bounds_error!())?;
        let parent_function_id = read_parent(parser)?;
        let count = read_count(parser)?;

        let mut names = Vec::with_capacity(count);
        let mut name_offsets = Vec::with_capacity(count);
        for _ in 0..count {
            // The lexical region never exceeds u32
            name_offsets.push(parser.pos() as u32);
            names.push(parser.read_prefixed_str()?);
        }

        Ok(LexicalRecord {
            offset,
            parent_function_id,
            names,
            name_offsets,
        })
    }

    /// Decodes only the parent function id of the record at `offset`.
    ///
    /// # Errors
    /// Same as [`LexicalRecord::decode`], limited to the first field.
    pub fn decode_parent(data: &[u8], offset: u32) -> Result<Option<u32>> {
        let mut parser = Parser::at(data, offset as usize)?;
        read_parent(&mut parser)
    }

    /// Returns `true` for a record with no parent and no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent_function_id.is_none() && self.names.is_empty()
    }
}

/// Iterator over every record of the lexical region, in encoding order.
///
/// Iteration fuses on the first error.
pub struct LexicalRecordIterator<'a> {
    parser: Parser<'a>,
    failed: bool,
}

impl<'a> LexicalRecordIterator<'a> {
    /// Creates an iterator over the lexical region `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        LexicalRecordIterator {
            parser: Parser::new(data),
            failed: false,
        }
    }
}

impl<'a> Iterator for LexicalRecordIterator<'a> {
    type Item = Result<LexicalRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || !self.parser.has_more_data() {
            return None;
        }

        let record = LexicalRecord::read(&mut self.parser);
        if record.is_err() {
            self.failed = true;
        }
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn empty_record_bytes() {
        let mut buffer = Vec::new();
        write_lexical_record::<&str>(&mut buffer, None, &[]);
        assert_eq!(buffer, [0x7F, 0x00]);

        let record = LexicalRecord::decode(&buffer, EMPTY_LEXICAL_DATA_OFFSET).unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn record_with_names() {
        let mut buffer = vec![0x7F, 0x00];
        write_lexical_record(&mut buffer, Some(3), &["x", "count"]);
        assert_eq!(
            &buffer[2..],
            &[0x03, 0x02, 0x01, b'x', 0x05, b'c', b'o', b'u', b'n', b't']
        );

        let record = LexicalRecord::decode(&buffer, 2).unwrap();
        assert_eq!(record.offset, 2);
        assert_eq!(record.parent_function_id, Some(3));
        assert_eq!(record.names, vec!["x", "count"]);
        assert_eq!(record.name_offsets, vec![4, 6]);
        assert_eq!(LexicalRecord::decode_parent(&buffer, 2).unwrap(), Some(3));
    }

    #[test]
    fn record_with_parent_only() {
        let mut buffer = Vec::new();
        write_lexical_record::<String>(&mut buffer, Some(0), &[]);
        let record = LexicalRecord::decode(&buffer, 0).unwrap();
        assert_eq!(record.parent_function_id, Some(0));
        assert!(record.names.is_empty());
        assert!(!record.is_empty());
    }

    #[test]
    fn iterator_walks_all_records() {
        let mut buffer = Vec::new();
        write_lexical_record::<&str>(&mut buffer, None, &[]);
        write_lexical_record(&mut buffer, Some(1), &["a"]);
        write_lexical_record(&mut buffer, None, &["b", "c"]);

        let records: Vec<_> = LexicalRecordIterator::new(&buffer)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].offset, 2);
        assert_eq!(records[1].names, vec!["a"]);
        assert_eq!(records[2].offset, 6);
        assert_eq!(records[2].names, vec!["b", "c"]);
    }

    #[test]
    fn negative_name_length_is_malformed() {
        let buffer = [0x7F, 0x01, 0x7E];
        assert!(matches!(
            LexicalRecord::decode(&buffer, 0),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn oversized_parent_is_malformed() {
        // parent = 2^32
        let buffer = [0x80, 0x80, 0x80, 0x80, 0x10, 0x00];
        assert!(matches!(
            LexicalRecord::decode_parent(&buffer, 0),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn impossible_name_count_is_malformed() {
        assert!(matches!(
            LexicalRecord::decode(&[0x7F, 0x7F], 0),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            LexicalRecord::decode(&[0x7F, 0x05, 0x00], 0),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn name_past_end_is_out_of_bounds() {
        let buffer = [0x7F, 0x01, 0x04, b'a', b'b'];
        assert!(matches!(
            LexicalRecord::decode(&buffer, 0),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn offset_outside_region_is_out_of_bounds() {
        assert!(matches!(
            LexicalRecord::decode(&[0x7F, 0x00], 2),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn iterator_fuses_on_error() {
        let buffer = [0x7F, 0x00, 0x7F, 0x01, 0x7E];
        let mut iter = LexicalRecordIterator::new(&buffer);
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }
}
