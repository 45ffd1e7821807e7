//! Immutable debug-info reader.
//!
//! [`DebugInfo`] owns the combined buffer (`[location stream][lexical data]`) together with
//! the file table and the filename table. Every query takes `&self`, so one reader can
//! serve any number of threads at once.
//!
//! # Query Overview
//!
//! - [`DebugInfo::get_location_for_address`] - bytecode address to source position
//! - [`DebugInfo::get_locations_for_addresses`] - the same for a batch, in parallel
//! - [`DebugInfo::get_address_for_location`] - source position to bytecode address
//! - [`DebugInfo::get_variable_names`], [`DebugInfo::get_parent_function_id`],
//!   [`DebugInfo::scope_chain`] - lexical scope lookups
//!
//! Absent debug information is reported as `Ok(None)`; damaged data as an error.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    debuginfo::{
        config::DebugInfoConfig,
        filetable::{FileTable, FileTableEntry, FilenameTable},
        lexical::{LexicalRecord, LexicalRecordIterator, EMPTY_LEXICAL_DATA_OFFSET},
        locations::{FunctionRecords, LocationDecoder},
        types::{DebugSearchResult, SourceLocation},
    },
    Error, Result,
};

/// Finalized, read-only debug information.
///
/// Created by [`crate::DebugInfoBuilder::finalize`] or reconstructed from stored parts with
/// [`DebugInfo::from_parts`].
#[derive(Debug, Clone)]
pub struct DebugInfo {
    filenames: FilenameTable,
    files: FileTable,
    lexical_start: u32,
    data: Vec<u8>,
    config: DebugInfoConfig,
}

impl DebugInfo {
    pub(crate) fn new_unchecked(
        filenames: FilenameTable,
        files: FileTable,
        lexical_start: u32,
        data: Vec<u8>,
        config: DebugInfoConfig,
    ) -> Self {
        DebugInfo {
            filenames,
            files,
            lexical_start,
            data,
            config,
        }
    }

    /// Reconstructs a reader from stored parts.
    ///
    /// `data` is the combined buffer and `lexical_start` the offset where its lexical
    /// region begins. The buffer size, the region boundary and the file table order are
    /// always checked; everything else according to `config`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] (or the decoding error found) if the parts are
    /// inconsistent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bytecode_debuginfo::{DebugInfo, DebugInfoConfig, FileTableEntry, FilenameTable};
    ///
    /// let filenames: FilenameTable = ["main.js"].into_iter().collect();
    /// let files = vec![FileTableEntry { from_offset: 0, filename_id: 0, source_mapping_url_id: 0 }];
    /// let data = vec![0x00, 0x01, 0x01, 0x05, 0x02, 0x02, 0x7F, 0x7F, 0x00];
    ///
    /// let info = DebugInfo::from_parts(filenames, files, 7, data, DebugInfoConfig::strict())?;
    /// assert_eq!(info.get_location_for_address(0, 5)?.unwrap().line, 2);
    /// # Ok::<(), bytecode_debuginfo::Error>(())
    /// ```
    pub fn from_parts(
        filenames: FilenameTable,
        files: Vec<FileTableEntry>,
        lexical_start: u32,
        data: Vec<u8>,
        config: DebugInfoConfig,
    ) -> Result<Self> {
        let info = match Self::validate_parts(filenames, files, lexical_start, data, config) {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "Rejected stored debug info");
                return Err(e);
            }
        };

        debug!(
            filenames = info.filenames.len(),
            file_entries = info.files.len(),
            lexical_start = lexical_start,
            size = info.data.len(),
            "Loaded debug info from parts"
        );

        Ok(info)
    }

    fn validate_parts(
        filenames: FilenameTable,
        files: Vec<FileTableEntry>,
        lexical_start: u32,
        data: Vec<u8>,
        config: DebugInfoConfig,
    ) -> Result<Self> {
        if u32::try_from(data.len()).is_err() {
            return Err(malformed_error!(
                "Debug info of {} bytes exceeds the 32-bit offset range",
                data.len()
            ));
        }
        if lexical_start as usize > data.len() {
            return Err(malformed_error!(
                "Lexical region start {} is past the end of the {} byte buffer",
                lexical_start,
                data.len()
            ));
        }

        let info = DebugInfo {
            filenames,
            files: FileTable::from_entries(files)?,
            lexical_start,
            data,
            config,
        };

        if config.verify_file_table {
            info.verify_file_table()?;
        }
        if config.verify_location_stream {
            for record in info.function_records() {
                record?;
            }
        }
        if config.verify_lexical_data {
            info.verify_lexical_data()?;
        }

        Ok(info)
    }

    fn verify_file_table(&self) -> Result<()> {
        for entry in &self.files {
            if entry.from_offset >= self.lexical_start {
                return Err(malformed_error!(
                    "File table entry at offset {} is outside the location stream (ends at {})",
                    entry.from_offset,
                    self.lexical_start
                ));
            }
            if self.filenames.get(entry.filename_id).is_none() {
                return Err(malformed_error!(
                    "File table entry at offset {} names unknown filename id {}",
                    entry.from_offset,
                    entry.filename_id
                ));
            }
        }
        Ok(())
    }

    fn verify_lexical_data(&self) -> Result<()> {
        let mut records = self.lexical_records();
        match records.next() {
            Some(Ok(record))
                if record.offset == EMPTY_LEXICAL_DATA_OFFSET && record.is_empty() => {}
            Some(Err(e)) => return Err(e),
            _ => {
                return Err(malformed_error!(
                    "Lexical region does not start with the empty scope record"
                ))
            }
        }

        for record in records {
            record?;
        }
        Ok(())
    }

    /// The filename table.
    #[must_use]
    pub fn filenames(&self) -> &FilenameTable {
        &self.filenames
    }

    /// The file table.
    #[must_use]
    pub fn file_table(&self) -> &FileTable {
        &self.files
    }

    /// Offset at which the lexical region starts; also the size of the location stream.
    #[must_use]
    pub fn lexical_start(&self) -> u32 {
        self.lexical_start
    }

    /// The combined buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The location stream region.
    #[must_use]
    pub fn location_data(&self) -> &[u8] {
        &self.data[..self.lexical_start as usize]
    }

    /// The lexical data region.
    #[must_use]
    pub fn lexical_data(&self) -> &[u8] {
        &self.data[self.lexical_start as usize..]
    }

    /// The configuration this reader was created with.
    #[must_use]
    pub fn config(&self) -> &DebugInfoConfig {
        &self.config
    }

    /// Resolves a filename id.
    #[must_use]
    pub fn filename_by_id(&self, id: u32) -> Option<&str> {
        self.filenames.get(id)
    }

    /// Filename id of the file covering `debug_offset` in the location stream.
    #[must_use]
    pub fn filename_for_offset(&self, debug_offset: u32) -> Option<u32> {
        self.files.filename_for_offset(debug_offset)
    }

    /// Iterates over every function record of the location stream.
    #[must_use]
    pub fn function_records(&self) -> FunctionRecords<'_> {
        FunctionRecords::new(self.location_data())
    }

    /// Iterates over every record of the lexical region.
    #[must_use]
    pub fn lexical_records(&self) -> LexicalRecordIterator<'_> {
        LexicalRecordIterator::new(self.lexical_data())
    }

    /// Finds the source position of an instruction.
    ///
    /// `debug_offset` is the offset returned by
    /// [`crate::DebugInfoBuilder::append_source_locations`] for the function and
    /// `offset_in_function` the instruction's address inside it. The result is the last
    /// location whose address does not exceed `offset_in_function` (the function start
    /// when none does), with `address` replaced by `offset_in_function` and the file taken
    /// from the file table.
    ///
    /// Returns `Ok(None)` if no file table entry covers the chosen location.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOffset`] if `debug_offset` lies past the location
    /// stream, or a decoding error if the record is damaged. The offset at the very end of
    /// the stream is the handle of a function without locations and yields `Ok(None)`.
    pub fn get_location_for_address(
        &self,
        debug_offset: u32,
        offset_in_function: u32,
    ) -> Result<Option<SourceLocation>> {
        // Handle of a trailing function without locations, or of empty debug info
        if debug_offset == self.lexical_start {
            return Ok(None);
        }
        if debug_offset > self.lexical_start {
            return Err(Error::InvalidOffset(debug_offset));
        }

        let mut decoder = LocationDecoder::new(self.location_data(), debug_offset as usize)?;
        let mut last = *decoder.current();
        let mut last_offset = debug_offset as usize;
        let mut next_offset = decoder.offset();

        while let Some(location) = decoder.next_location()? {
            if location.address > offset_in_function {
                break;
            }
            last = location;
            last_offset = next_offset;
            next_offset = decoder.offset();
        }

        // The location region never exceeds u32, so neither does an offset inside it
        let Some(file) = self.files.entry_for_offset(last_offset as u32) else {
            return Ok(None);
        };

        last.address = offset_in_function;
        last.filename_id = file.filename_id;
        last.source_mapping_url_id = file.source_mapping_url_id;
        Ok(Some(last))
    }

    /// Resolves a batch of `(debug_offset, offset_in_function)` pairs in parallel.
    ///
    /// Results are in input order; each has the meaning of
    /// [`DebugInfo::get_location_for_address`].
    #[must_use]
    pub fn get_locations_for_addresses(
        &self,
        queries: &[(u32, u32)],
    ) -> Vec<Result<Option<SourceLocation>>> {
        queries
            .par_iter()
            .map(|&(debug_offset, offset_in_function)| {
                self.get_location_for_address(debug_offset, offset_in_function)
            })
            .collect()
    }

    /// Finds the first instruction generated for a source position.
    ///
    /// The search covers the location-stream window of the first file table entry for
    /// `filename_id`, up to the next entry (or the end of the stream). Function records
    /// are decoded in order, header location included, and the first location on `line`
    /// (and `column`, when given) wins.
    ///
    /// # Errors
    /// Returns a decoding error if a record inside the window is damaged.
    pub fn get_address_for_location(
        &self,
        filename_id: u32,
        line: u32,
        column: Option<u32>,
    ) -> Result<Option<DebugSearchResult>> {
        let Some(window) = self
            .files
            .window_for_filename(filename_id, self.lexical_start)
        else {
            return Ok(None);
        };

        let is_match = |location: &SourceLocation| {
            location.line == line && column.map_or(true, |column| location.column == column)
        };
        let found = |function_index: u32, location: &SourceLocation| DebugSearchResult {
            function_index,
            bytecode_offset: location.address,
            line: location.line,
            column: location.column,
        };

        let data = self.location_data();
        let mut offset = window.start as usize;
        while offset < window.end as usize {
            let mut decoder = LocationDecoder::new(data, offset)?;
            let function_index = decoder.function_index();

            if is_match(decoder.current()) {
                return Ok(Some(found(function_index, decoder.current())));
            }
            while let Some(location) = decoder.next_location()? {
                if is_match(&location) {
                    return Ok(Some(found(function_index, &location)));
                }
            }

            offset = decoder.offset();
        }

        Ok(None)
    }

    /// Names of the variables of the scope record at `offset` of the lexical region.
    ///
    /// # Errors
    /// Returns an error if `offset` is outside the lexical region or the record is damaged.
    pub fn get_variable_names(&self, offset: u32) -> Result<Vec<&str>> {
        Ok(self.lexical_record(offset)?.names)
    }

    /// Parent function id of the scope record at `offset`, `None` for a root scope.
    ///
    /// # Errors
    /// Returns an error if `offset` is outside the lexical region or the id is damaged.
    pub fn get_parent_function_id(&self, offset: u32) -> Result<Option<u32>> {
        LexicalRecord::decode_parent(self.lexical_data(), offset)
    }

    /// The full scope record at `offset` of the lexical region.
    ///
    /// # Errors
    /// Same as [`DebugInfo::get_variable_names`].
    pub fn lexical_record(&self, offset: u32) -> Result<LexicalRecord<'_>> {
        LexicalRecord::decode(self.lexical_data(), offset)
    }

    /// Walks a lexical scope chain, innermost scope first.
    ///
    /// Starts with the record at `offset` and follows parent function ids. `resolve` maps a
    /// function id to the lexical offset of that function's scope; the walk ends at a root
    /// scope or when `resolve` returns `None`.
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] if the chain is longer than
    /// [`DebugInfoConfig::max_scope_depth`], and the errors of [`DebugInfo::lexical_record`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bytecode_debuginfo::DebugInfoBuilder;
    ///
    /// let mut builder = DebugInfoBuilder::new();
    /// let outer = builder.append_lexical_data(None, &["module"]);
    /// let inner = builder.append_lexical_data(Some(0), &["x"]);
    /// let info = builder.finalize();
    ///
    /// let scope_of_function = |id: u32| (id == 0).then_some(outer);
    /// let chain = info.scope_chain(inner, scope_of_function)?;
    /// assert_eq!(chain.len(), 2);
    /// assert_eq!(chain[1].names, vec!["module"]);
    /// # Ok::<(), bytecode_debuginfo::Error>(())
    /// ```
    pub fn scope_chain<F>(&self, offset: u32, mut resolve: F) -> Result<Vec<LexicalRecord<'_>>>
    where
        F: FnMut(u32) -> Option<u32>,
    {
        let max_depth = self.config.max_scope_depth;
        let mut chain = Vec::new();
        let mut next = Some(offset);

        while let Some(offset) = next {
            if chain.len() >= max_depth {
                return Err(Error::RecursionLimit(max_depth));
            }

            let record = self.lexical_record(offset)?;
            next = record.parent_function_id.and_then(&mut resolve);
            chain.push(record);
        }

        Ok(chain)
    }
}
