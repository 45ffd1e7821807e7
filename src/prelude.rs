//! # bytecode-debuginfo Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the
//! library. Import it to build, query and export debug information without spelling out
//! module paths.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all operations
pub use crate::Error;

/// The result type used throughout the crate
pub use crate::Result;

/// Validation settings for reconstructing a reader
pub use crate::DebugInfoConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Append-only producer of debug information
pub use crate::DebugInfoBuilder;

/// Immutable reader answering debug queries
pub use crate::DebugInfo;

/// Low-level parsing cursor
pub use crate::Parser;

// ================================================================================================
// Value Types
// ================================================================================================

/// Address to source position correspondence
pub use crate::debuginfo::SourceLocation;

/// Result of a source position to address search
pub use crate::debuginfo::DebugSearchResult;

/// File table and its entries
pub use crate::debuginfo::{FileTable, FileTableEntry};

/// Filename string table
pub use crate::debuginfo::FilenameTable;

/// Decoded lexical scope record
pub use crate::debuginfo::LexicalRecord;

/// Offset of the shared empty scope record
pub use crate::debuginfo::EMPTY_LEXICAL_DATA_OFFSET;

// ================================================================================================
// Output
// ================================================================================================

/// Section selection for disassembly
pub use crate::debuginfo::DisassemblySections;

/// Source map structures
pub use crate::debuginfo::{MappingsLine, Segment, SourceMap};

// ================================================================================================
// Debugger
// ================================================================================================

/// Debugger state and its read-only view
pub use crate::debugger::{DebuggerContext, DebuggerInternal, PauseOnThrowMode};
