//! File table and filename table.
//!
//! The file table associates ranges of the location stream with source files. Entry `i`
//! covers the byte offsets from its `from_offset` up to the `from_offset` of entry `i + 1`
//! (or the end of the location stream). Entries are kept in non-decreasing `from_offset`
//! order; lookups rely on it.
//!
//! The filename table is the string table the file table's ids point into.
//!
//! Neither structure is embedded in the combined buffer. They travel alongside it.

use std::{collections::HashMap, ops::Range};

use crate::Result;

/// Start of the location-stream range belonging to one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileTableEntry {
    /// Byte offset into the location stream where the range starts.
    pub from_offset: u32,
    /// Filename table id of the source file.
    pub filename_id: u32,
    /// Filename table id of the file's `sourceMappingURL`.
    pub source_mapping_url_id: u32,
}

/// Ordered list of [`FileTableEntry`] values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTable {
    entries: Vec<FileTableEntry>,
}

impl FileTable {
    /// Creates an empty file table.
    #[must_use]
    pub fn new() -> Self {
        FileTable::default()
    }

    /// Creates a file table from stored entries.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the entries are not in non-decreasing
    /// `from_offset` order.
    pub fn from_entries(entries: Vec<FileTableEntry>) -> Result<Self> {
        if let Some(pos) = entries
            .windows(2)
            .position(|pair| pair[0].from_offset > pair[1].from_offset)
        {
            return Err(malformed_error!(
                "File table entry {} (offset {}) precedes entry {} (offset {})",
                pos + 1,
                entries[pos + 1].from_offset,
                pos,
                entries[pos].from_offset
            ));
        }

        Ok(FileTable { entries })
    }

    /// Appends an entry.
    ///
    /// # Panics
    /// Panics if `entry` starts before the last entry, the builder only ever appends at the
    /// current end of the stream.
    pub(crate) fn push(&mut self, entry: FileTableEntry) {
        if let Some(last) = self.entries.last() {
            assert!(
                last.from_offset <= entry.from_offset,
                "file table entries must be appended in stream order"
            );
        }
        self.entries.push(entry);
    }

    /// The most recently appended entry.
    #[must_use]
    pub fn last(&self) -> Option<&FileTableEntry> {
        self.entries.last()
    }

    /// All entries, in stream order.
    #[must_use]
    pub fn entries(&self) -> &[FileTableEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in stream order.
    pub fn iter(&self) -> std::slice::Iter<'_, FileTableEntry> {
        self.entries.iter()
    }

    /// The entry covering `debug_offset`: the one with the greatest `from_offset` that is
    /// not after it. `None` if `debug_offset` precedes every entry.
    #[must_use]
    pub fn entry_for_offset(&self, debug_offset: u32) -> Option<&FileTableEntry> {
        let end = self
            .entries
            .partition_point(|entry| entry.from_offset <= debug_offset);
        end.checked_sub(1).map(|index| &self.entries[index])
    }

    /// Filename id of the entry covering `debug_offset`.
    #[must_use]
    pub fn filename_for_offset(&self, debug_offset: u32) -> Option<u32> {
        self.entry_for_offset(debug_offset)
            .map(|entry| entry.filename_id)
    }

    /// Byte window of the location stream belonging to `filename_id`.
    ///
    /// Only the first entry for the file is considered: the window runs from its
    /// `from_offset` to the `from_offset` of the entry right after it, or to `region_end`
    /// when it is the last entry.
    #[must_use]
    pub fn window_for_filename(&self, filename_id: u32, region_end: u32) -> Option<Range<u32>> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.filename_id == filename_id)?;

        let start = self.entries[index].from_offset;
        let end = self
            .entries
            .get(index + 1)
            .map_or(region_end, |next| next.from_offset);

        Some(start..end)
    }
}

impl<'a> IntoIterator for &'a FileTable {
    type Item = &'a FileTableEntry;
    type IntoIter = std::slice::Iter<'a, FileTableEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Uniquing table of filenames, addressed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilenameTable {
    names: Vec<String>,
    ids: HashMap<String, u32>,
}

impl FilenameTable {
    /// Creates an empty filename table.
    #[must_use]
    pub fn new() -> Self {
        FilenameTable::default()
    }

    /// Adds `name` and returns its id. Adding a name twice returns the existing id.
    ///
    /// # Panics
    /// Panics if the table already holds `u32::MAX` names.
    pub fn add(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }

        let id = u32::try_from(self.names.len())
            .unwrap_or_else(|_| panic!("filename table is limited to u32::MAX entries"));
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Looks up the name with the given id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    /// Looks up the id of `name`.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the table holds no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over the names in id order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for FilenameTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = FilenameTable::new();
        for name in iter {
            table.add(name.as_ref());
        }
        table
    }
}
