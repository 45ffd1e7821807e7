//! Human-readable dumps of debug information.
//!
//! The output is meant for people and test diffs; its exact layout is not stable.

use std::fmt::Write;

use bitflags::bitflags;

use crate::{debuginfo::reader::DebugInfo, Result};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Sections selected for [`DebugInfo::disassemble`]
    pub struct DisassemblySections: u32 {
        /// The filename table
        const FILENAMES = 0x0001;
        /// The file table and every function location record
        const FILES_AND_OFFSETS = 0x0002;
        /// Every lexical scope record
        const LEXICAL_DATA = 0x0004;
    }
}

impl Default for DisassemblySections {
    fn default() -> Self {
        DisassemblySections::all()
    }
}

impl DebugInfo {
    /// Writes the filename table, one `id: name` line per entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Format`] if `out` rejects a write.
    pub fn disassemble_filenames<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Debug filename table:")?;
        for (id, name) in self.filenames().iter().enumerate() {
            writeln!(out, "  {}: {}", id, name)?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// Writes the file table, then every function record of the location stream in
    /// encoding order.
    ///
    /// # Errors
    /// Returns [`crate::Error::Format`] if `out` rejects a write, or the decoding error of
    /// the first damaged record.
    pub fn disassemble_files_and_offsets<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Debug file table:")?;
        for entry in self.file_table() {
            writeln!(
                out,
                "  Debug offset {}: string id {}",
                entry.from_offset, entry.filename_id
            )?;
        }
        if self.file_table().is_empty() {
            writeln!(out, "(none)")?;
        }
        writeln!(out)?;

        writeln!(out, "Debug data table:")?;
        let mut end = 0;
        for record in self.function_records() {
            let record = record?;
            write!(
                out,
                "  DebugOffset {:#x} for function at {} starts at line={}, col={} and emits locations for ",
                record.offset, record.function_index, record.start.line, record.start.column
            )?;
            for (_, location) in &record.locations {
                write!(out, "{} ", location.address)?;
            }
            writeln!(out, " ({} in total).", record.locations.len())?;
            end = record.end_offset;
        }
        writeln!(out, "  Debug table ends at debugOffset {:#x}", end)?;
        Ok(())
    }

    /// Writes every lexical scope record with its names.
    ///
    /// # Errors
    /// Returns [`crate::Error::Format`] if `out` rejects a write, or the decoding error of
    /// the first damaged record.
    pub fn disassemble_lexical_data<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Debug variables table:")?;
        for record in self.lexical_records() {
            let record = record?;
            write!(
                out,
                "  Offset: {:#x}, vars count: {}, lexical parent: ",
                record.offset,
                record.names.len()
            )?;
            match record.parent_function_id {
                Some(parent) => writeln!(out, "{}", parent)?,
                None => writeln!(out, "none")?,
            }

            for (offset, name) in record.name_offsets.iter().zip(&record.names) {
                writeln!(out, "    {:#06x}: {:?}", offset, name)?;
            }
        }
        Ok(())
    }

    /// Writes the selected sections to `out`, in table order.
    ///
    /// # Errors
    /// Same as the individual section writers.
    pub fn disassemble_to<W: Write>(&self, out: &mut W, sections: DisassemblySections) -> Result<()> {
        if sections.contains(DisassemblySections::FILENAMES) {
            self.disassemble_filenames(out)?;
        }
        if sections.contains(DisassemblySections::FILES_AND_OFFSETS) {
            self.disassemble_files_and_offsets(out)?;
        }
        if sections.contains(DisassemblySections::LEXICAL_DATA) {
            self.disassemble_lexical_data(out)?;
        }
        Ok(())
    }

    /// Returns the selected sections as a string.
    ///
    /// # Errors
    /// Returns the decoding error of the first damaged record.
    pub fn disassemble(&self, sections: DisassemblySections) -> Result<String> {
        let mut out = String::new();
        self.disassemble_to(&mut out, sections)?;
        Ok(out)
    }
}
