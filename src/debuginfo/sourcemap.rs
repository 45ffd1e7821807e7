//! Source map emission.
//!
//! Bytecode is not text, so the mapping is interpreted loosely: each bytecode module is one
//! generated line, and an instruction's absolute offset in the bytecode file is its
//! generated column. [`DebugInfo::emit_source_map`] fills a [`SourceMap`] that way; turning
//! it into the textual VLQ/JSON form is left to the caller.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{debuginfo::reader::DebugInfo, Error, Result};

/// One mapping from a generated position to a source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    /// Absolute bytecode offset of the instruction.
    pub generated_column: u32,
    /// Index into [`SourceMap::sources`].
    pub source_index: u32,
    /// Source line.
    pub represented_line: u32,
    /// Source column.
    pub represented_column: u32,
}

/// The segments of one bytecode module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingsLine {
    /// Segments in emission order.
    pub segments: Vec<Segment>,
    /// Offset identifying the module this line describes.
    pub line_offset: u32,
}

impl MappingsLine {
    /// The segment with the greatest generated column not after `generated_column`.
    ///
    /// Only meaningful when the segments are sorted by generated column, which holds when
    /// function offsets increase with function index.
    #[must_use]
    pub fn lookup(&self, generated_column: u32) -> Option<&Segment> {
        let end = self
            .segments
            .partition_point(|segment| segment.generated_column <= generated_column);
        end.checked_sub(1).map(|index| &self.segments[index])
    }
}

/// Source map under construction: a uniquing source list plus mapping lines.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    sources: Vec<String>,
    source_indices: HashMap<String, u32>,
    lines: Vec<MappingsLine>,
}

impl SourceMap {
    /// Creates an empty source map.
    #[must_use]
    pub fn new() -> Self {
        SourceMap::default()
    }

    /// Index of `source` in the source list, adding it on first use.
    ///
    /// # Panics
    /// Panics if the source list already holds `u32::MAX` entries.
    pub fn get_source_index(&mut self, source: &str) -> u32 {
        if let Some(&index) = self.source_indices.get(source) {
            return index;
        }

        let index = u32::try_from(self.sources.len())
            .unwrap_or_else(|_| panic!("source map is limited to u32::MAX sources"));
        self.sources.push(source.to_string());
        self.source_indices.insert(source.to_string(), index);
        index
    }

    /// Appends a mapping line.
    pub fn add_mappings_line(&mut self, segments: Vec<Segment>, line_offset: u32) {
        self.lines.push(MappingsLine {
            segments,
            line_offset,
        });
    }

    /// The source list, in index order.
    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// The mapping lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[MappingsLine] {
        &self.lines
    }

    /// The mapping line added with `line_offset`.
    #[must_use]
    pub fn line(&self, line_offset: u32) -> Option<&MappingsLine> {
        self.lines.iter().find(|line| line.line_offset == line_offset)
    }
}

impl DebugInfo {
    /// Adds the mappings of every function record as one line of `source_map`.
    ///
    /// `function_offsets[i]` is the offset of function `i`'s bytecode in the file; each
    /// location, function start included, becomes a segment at `address + offset`. The
    /// source of every segment of a function is the file covering the start of its record,
    /// so a file change inside a function does not show up in the map.
    /// `module_offset` keys the resulting line.
    ///
    /// `source_map` is left untouched when an error is returned.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingFunctionOffset`] for a function index past the end of
    /// `function_offsets`, [`crate::Error::Malformed`] for a function record no file table
    /// entry covers, and the decoding error of the first damaged record.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bytecode_debuginfo::{DebugInfoBuilder, SourceLocation, SourceMap};
    ///
    /// let mut builder = DebugInfoBuilder::new();
    /// let file = builder.add_filename("main.js");
    /// builder.append_source_locations(
    ///     &SourceLocation::new(0, 1, 1, file),
    ///     0,
    ///     &[SourceLocation::new(5, 2, 3, file)],
    /// );
    /// let info = builder.finalize();
    ///
    /// let mut map = SourceMap::new();
    /// info.emit_source_map(&mut map, &[100], 0)?;
    ///
    /// let columns: Vec<_> = map.lines()[0].segments.iter().map(|s| s.generated_column).collect();
    /// assert_eq!(columns, vec![100, 105]);
    /// assert_eq!(map.sources(), ["main.js"]);
    /// # Ok::<(), bytecode_debuginfo::Error>(())
    /// ```
    pub fn emit_source_map(
        &self,
        source_map: &mut SourceMap,
        function_offsets: &[u32],
        module_offset: u32,
    ) -> Result<()> {
        let mut pending = Vec::new();

        for record in self.function_records() {
            let record = record?;
            let function_offset = *function_offsets
                .get(record.function_index as usize)
                .ok_or(Error::MissingFunctionOffset(record.function_index))?;

            // Offsets inside the location region fit in u32
            let filename = self
                .filename_for_offset(record.offset as u32)
                .and_then(|id| self.filename_by_id(id));
            let Some(filename) = filename else {
                warn!(
                    debug_offset = record.offset,
                    function_index = record.function_index,
                    "No file covers function record"
                );
                return Err(malformed_error!(
                    "No file covers the record of function {} at debug offset {}",
                    record.function_index,
                    record.offset
                ));
            };

            for (_, location) in record.all_locations() {
                let generated_column =
                    location.address.checked_add(function_offset).ok_or_else(|| {
                        malformed_error!(
                            "Address {} of function {} overflows at file offset {}",
                            location.address,
                            record.function_index,
                            function_offset
                        )
                    })?;

                pending.push((filename, generated_column, location.line, location.column));
            }
        }

        let segments: Vec<Segment> = pending
            .into_iter()
            .map(|(filename, generated_column, line, column)| Segment {
                generated_column,
                source_index: source_map.get_source_index(filename),
                represented_line: line,
                represented_column: column,
            })
            .collect();

        debug!(
            module_offset = module_offset,
            segments = segments.len(),
            sources = source_map.sources().len(),
            "Emitted source map line"
        );

        source_map.add_mappings_line(segments, module_offset);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        debuginfo::{DebugInfoBuilder, SourceLocation},
        test::factories::{sample_debug_info, split_file_debug_info},
    };

    #[test]
    fn source_index_is_unique() {
        let mut map = SourceMap::new();
        assert_eq!(map.get_source_index("a.js"), 0);
        assert_eq!(map.get_source_index("b.js"), 1);
        assert_eq!(map.get_source_index("a.js"), 0);
        assert_eq!(map.sources(), ["a.js", "b.js"]);
    }

    #[test]
    fn emits_every_location_of_every_function() {
        let (info, _) = sample_debug_info();
        let mut map = SourceMap::new();
        info.emit_source_map(&mut map, &[0, 100], 7).unwrap();

        let line = map.line(7).unwrap();
        let triples: Vec<_> = line
            .segments
            .iter()
            .map(|s| (s.generated_column, s.source_index, s.represented_line, s.represented_column))
            .collect();
        assert_eq!(
            triples,
            vec![
                (0, 0, 1, 1),
                (5, 0, 2, 3),
                (9, 0, 2, 7),
                (100, 1, 10, 1),
                (103, 1, 11, 5),
            ]
        );
        assert_eq!(map.sources(), ["main.js", "helper.js"]);
    }

    #[test]
    fn segment_lookup() {
        let (info, _) = sample_debug_info();
        let mut map = SourceMap::new();
        info.emit_source_map(&mut map, &[0, 100], 0).unwrap();

        let line = &map.lines()[0];
        assert_eq!(line.lookup(7).unwrap().represented_column, 3);
        assert_eq!(line.lookup(101).unwrap().represented_line, 10);
        assert_eq!(line.lookup(500).unwrap().represented_line, 11);
    }

    #[test]
    fn file_change_inside_function_keeps_record_source() {
        let info = split_file_debug_info();
        let mut map = SourceMap::new();
        info.emit_source_map(&mut map, &[0], 0).unwrap();

        let sources: Vec<_> = map.lines()[0]
            .segments
            .iter()
            .map(|s| map.sources()[s.source_index as usize].as_str())
            .collect();
        assert_eq!(sources, vec!["a.js", "a.js", "a.js"]);
        assert_eq!(map.sources(), ["a.js"]);
    }

    #[test]
    fn missing_function_offset() {
        let (info, _) = sample_debug_info();
        let mut map = SourceMap::new();
        let result = info.emit_source_map(&mut map, &[0], 0);
        assert!(matches!(result, Err(Error::MissingFunctionOffset(1))));
        assert!(map.lines().is_empty());
        assert!(map.sources().is_empty());
    }

    #[test]
    fn empty_debug_info_adds_empty_line() {
        let info = DebugInfoBuilder::new().finalize();
        let mut map = SourceMap::new();
        info.emit_source_map(&mut map, &[], 3).unwrap();
        assert_eq!(map.lines().len(), 1);
        assert!(map.lines()[0].segments.is_empty());
        assert_eq!(map.lines()[0].line_offset, 3);
    }

    #[test]
    fn uncovered_location_is_malformed() {
        let mut builder = DebugInfoBuilder::new();
        let file = builder.add_filename("a.js");
        builder.append_source_locations(
            &SourceLocation::new(0, 1, 1, file),
            0,
            &[SourceLocation::new(1, 1, 2, file)],
        );
        let info = builder.finalize();
        let stripped = DebugInfo::from_parts(
            info.filenames().clone(),
            Vec::new(),
            info.lexical_start(),
            info.data().to_vec(),
            crate::DebugInfoConfig::default(),
        )
        .unwrap();

        let mut map = SourceMap::new();
        let result = stripped.emit_source_map(&mut map, &[0], 0);
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }
}
