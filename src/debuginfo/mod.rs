//! Bytecode debug information: building, querying and exporting.
//!
//! Debug information maps bytecode addresses back to source positions and records the
//! variable names of lexical scopes. It is produced once by a [`DebugInfoBuilder`] while
//! the compiler emits functions, then frozen into a [`DebugInfo`] that debuggers, stack
//! unwinders and source map exporters query.
//!
//! # Architecture
//!
//! The encoded data lives in one combined buffer of two regions:
//!
//! ```text
//! +---------------------------+-------------------------+
//! | location stream           | lexical data            |
//! | one record per function   | one record per scope    |
//! +---------------------------+-------------------------+
//! 0                     lexical_start                   len
//! ```
//!
//! Two side structures travel with it: the [`FileTable`], mapping ranges of the location
//! stream to source files, and the [`FilenameTable`] the file ids point into.
//!
//! # Key Components
//!
//! - [`locations`] - location stream record codec
//! - [`filetable`] - file table and filename table
//! - [`lexical`] - lexical scope record codec
//! - [`builder`] - [`DebugInfoBuilder`]
//! - [`reader`] - [`DebugInfo`] and its queries
//! - [`disassembler`] - human-readable dumps
//! - [`sourcemap`] - source map emission
//! - [`config`] - validation settings for [`DebugInfo::from_parts`]
//!
//! # Examples
//!
//! ```rust
//! use bytecode_debuginfo::{DebugInfoBuilder, DisassemblySections, SourceLocation};
//!
//! let mut builder = DebugInfoBuilder::new();
//! let file = builder.add_filename("main.js");
//! builder.append_source_locations(
//!     &SourceLocation::new(0, 1, 1, file),
//!     0,
//!     &[SourceLocation::new(5, 2, 3, file), SourceLocation::new(9, 2, 7, file)],
//! );
//! let info = builder.finalize();
//!
//! let found = info.get_address_for_location(file, 2, Some(7))?.unwrap();
//! assert_eq!(found.bytecode_offset, 9);
//!
//! let dump = info.disassemble(DisassemblySections::all())?;
//! assert!(dump.contains("(2 in total)"));
//! # Ok::<(), bytecode_debuginfo::Error>(())
//! ```

pub mod builder;
pub mod config;
pub mod disassembler;
pub mod filetable;
pub mod lexical;
pub mod locations;
pub mod reader;
pub mod sourcemap;
pub mod types;

pub use builder::DebugInfoBuilder;
pub use config::DebugInfoConfig;
pub use disassembler::DisassemblySections;
pub use filetable::{FileTable, FileTableEntry, FilenameTable};
pub use lexical::{LexicalRecord, LexicalRecordIterator, EMPTY_LEXICAL_DATA_OFFSET};
pub use locations::{FunctionRecord, FunctionRecords, LocationDecoder};
pub use reader::DebugInfo;
pub use sourcemap::{MappingsLine, Segment, SourceMap};
pub use types::{DebugSearchResult, SourceLocation};
