//! Append-only construction of debug information.
//!
//! The compiler drives a [`DebugInfoBuilder`] once per function, interleaving location
//! records with lexical scope records, then calls [`DebugInfoBuilder::finalize`] to obtain
//! the immutable [`DebugInfo`] reader. `finalize` consumes the builder, so appending after
//! it is rejected at compile time.
//!
//! # Examples
//!
//! ```rust
//! use bytecode_debuginfo::{DebugInfoBuilder, SourceLocation};
//!
//! let mut builder = DebugInfoBuilder::new();
//! let file = builder.add_filename("main.js");
//!
//! let start = SourceLocation::new(0, 1, 1, file);
//! let offset = builder.append_source_locations(
//!     &start,
//!     0,
//!     &[SourceLocation::new(5, 2, 3, file), SourceLocation::new(9, 2, 7, file)],
//! );
//! let scope = builder.append_lexical_data(None, &["x", "y"]);
//!
//! let info = builder.finalize();
//! let location = info.get_location_for_address(offset, 6)?.unwrap();
//! assert_eq!((location.line, location.column), (2, 3));
//! assert_eq!(info.get_variable_names(scope)?, vec!["x", "y"]);
//! # Ok::<(), bytecode_debuginfo::Error>(())
//! ```

use tracing::{debug, trace};

use crate::debuginfo::{
    config::DebugInfoConfig,
    filetable::{FileTable, FileTableEntry, FilenameTable},
    lexical::{write_lexical_record, EMPTY_LEXICAL_DATA_OFFSET},
    locations::{encode_end_of_function, encode_function_header, encode_location_delta},
    reader::DebugInfo,
    types::SourceLocation,
};

fn to_offset(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("debug info exceeds the 32-bit offset range"))
}

/// Write-only accumulator for debug information.
///
/// Location records go to the location stream, scope records to the lexical region. The
/// two regions are only joined by [`DebugInfoBuilder::finalize`].
#[derive(Debug, Clone)]
pub struct DebugInfoBuilder {
    filenames: FilenameTable,
    files: FileTable,
    locations: Vec<u8>,
    lexical: Vec<u8>,
}

impl Default for DebugInfoBuilder {
    fn default() -> Self {
        DebugInfoBuilder::new()
    }
}

impl DebugInfoBuilder {
    /// Creates a builder with an empty filename table.
    #[must_use]
    pub fn new() -> Self {
        DebugInfoBuilder::with_filenames(FilenameTable::new())
    }

    /// Creates a builder whose filename ids refer to `filenames`.
    #[must_use]
    pub fn with_filenames(filenames: FilenameTable) -> Self {
        let mut lexical = Vec::new();
        write_lexical_record::<&str>(&mut lexical, None, &[]);

        DebugInfoBuilder {
            filenames,
            files: FileTable::new(),
            locations: Vec::new(),
            lexical,
        }
    }

    /// Adds a filename (or `sourceMappingURL`) and returns its id.
    pub fn add_filename(&mut self, name: &str) -> u32 {
        self.filenames.add(name)
    }

    /// The filename table built so far.
    #[must_use]
    pub fn filenames(&self) -> &FilenameTable {
        &self.filenames
    }

    /// The file table built so far.
    #[must_use]
    pub fn file_table(&self) -> &FileTable {
        &self.files
    }

    /// Current size of the location stream; the offset the next record will get.
    #[must_use]
    pub fn location_offset(&self) -> u32 {
        to_offset(self.locations.len())
    }

    /// Appends the location record of one function and returns its debug offset.
    ///
    /// `start` is the position of the function itself (address `0`); `rest` are the
    /// locations of its instructions in increasing address order. When `rest` is empty no
    /// record is written and the returned offset is where the next record will start.
    ///
    /// A file table entry is added whenever the source file differs from the previous one,
    /// both at the start of the record and between consecutive locations.
    ///
    /// # Panics
    /// Panics if `start.address` or `start.statement` is not `0`, if two consecutive addresses step back by
    /// exactly one, or if the location stream outgrows 32-bit offsets.
    pub fn append_source_locations(
        &mut self,
        start: &SourceLocation,
        function_index: u32,
        rest: &[SourceLocation],
    ) -> u32 {
        assert!(start.address == 0, "function must start at address 0");
        assert!(
            start.statement == 0,
            "function must start at statement 0"
        );

        let start_offset = self.location_offset();
        if rest.is_empty() {
            return start_offset;
        }

        if self
            .files
            .last()
            .map_or(true, |last| last.filename_id != start.filename_id)
        {
            self.files.push(FileTableEntry {
                from_offset: start_offset,
                filename_id: start.filename_id,
                source_mapping_url_id: start.source_mapping_url_id,
            });
        }

        encode_function_header(&mut self.locations, function_index, start);

        let mut previous = start;
        for next in rest {
            if next.filename_id != previous.filename_id {
                self.files.push(FileTableEntry {
                    from_offset: self.location_offset(),
                    filename_id: next.filename_id,
                    source_mapping_url_id: start.source_mapping_url_id,
                });
            }

            encode_location_delta(&mut self.locations, previous, next);
            previous = next;
        }
        encode_end_of_function(&mut self.locations);

        trace!(
            function_index = function_index,
            offset = start_offset,
            locations = rest.len(),
            size = self.locations.len() - start_offset as usize,
            "Appended function location record"
        );

        start_offset
    }

    /// Appends a lexical scope record and returns its offset in the lexical region.
    ///
    /// A scope without parent and without names shares the empty record at
    /// [`EMPTY_LEXICAL_DATA_OFFSET`]; nothing is written for it.
    ///
    /// # Panics
    /// Panics if the lexical region outgrows 32-bit offsets.
    pub fn append_lexical_data<S: AsRef<str>>(
        &mut self,
        parent_function_id: Option<u32>,
        names: &[S],
    ) -> u32 {
        if parent_function_id.is_none() && names.is_empty() {
            return EMPTY_LEXICAL_DATA_OFFSET;
        }

        let offset = to_offset(self.lexical.len());
        write_lexical_record(&mut self.lexical, parent_function_id, names);

        trace!(
            offset = offset,
            parent = ?parent_function_id,
            names = names.len(),
            "Appended lexical record"
        );

        offset
    }

    /// Joins both regions and turns the builder into a reader.
    ///
    /// The reader uses [`DebugInfoConfig::default`]; no validation runs since the builder
    /// only produces well-formed data.
    ///
    /// # Panics
    /// Panics if the combined buffer outgrows 32-bit offsets.
    #[must_use]
    pub fn finalize(self) -> DebugInfo {
        self.finalize_with_config(DebugInfoConfig::default())
    }

    /// Like [`DebugInfoBuilder::finalize`], with an explicit reader configuration.
    ///
    /// # Panics
    /// Panics if the combined buffer outgrows 32-bit offsets.
    #[must_use]
    pub fn finalize_with_config(self, config: DebugInfoConfig) -> DebugInfo {
        let DebugInfoBuilder {
            filenames,
            files,
            mut locations,
            lexical,
        } = self;

        let lexical_start = to_offset(locations.len());
        locations.extend_from_slice(&lexical);
        to_offset(locations.len());

        debug!(
            filenames = filenames.len(),
            file_entries = files.len(),
            lexical_start = lexical_start,
            size = locations.len(),
            "Finalized debug info"
        );

        DebugInfo::new_unchecked(filenames, files, lexical_start, locations, config)
    }
}
