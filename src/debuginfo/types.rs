//! Value types exchanged with the builder and returned by reader queries.

/// One correspondence between a bytecode address and a source position.
///
/// The compiler hands these to [`crate::DebugInfoBuilder::append_source_locations`]; the
/// reader hands them back from [`crate::DebugInfo::get_location_for_address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    /// Bytecode offset relative to the start of the function.
    pub address: u32,
    /// Source line.
    pub line: u32,
    /// Source column.
    pub column: u32,
    /// Statement number. A change of statement between two locations marks a stepping
    /// boundary for the debugger.
    pub statement: u32,
    /// Index into the filename table.
    pub filename_id: u32,
    /// Index into the filename table of the `sourceMappingURL` for this file.
    pub source_mapping_url_id: u32,
}

impl SourceLocation {
    /// Creates a location in file `filename_id` with statement `0` and no source map url.
    #[must_use]
    pub fn new(address: u32, line: u32, column: u32, filename_id: u32) -> Self {
        SourceLocation {
            address,
            line,
            column,
            statement: 0,
            filename_id,
            source_mapping_url_id: 0,
        }
    }

    /// Returns a copy with the statement number replaced.
    #[must_use]
    pub fn with_statement(mut self, statement: u32) -> Self {
        self.statement = statement;
        self
    }

    /// Returns a copy with the source mapping url id replaced.
    #[must_use]
    pub fn with_source_mapping_url(mut self, source_mapping_url_id: u32) -> Self {
        self.source_mapping_url_id = source_mapping_url_id;
        self
    }
}

/// Result of a source position to bytecode address search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebugSearchResult {
    /// Index of the function containing the match.
    pub function_index: u32,
    /// Bytecode offset of the match, relative to the start of the function.
    pub bytecode_offset: u32,
    /// Matched source line.
    pub line: u32,
    /// Matched source column.
    pub column: u32,
}
