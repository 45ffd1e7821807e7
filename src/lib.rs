// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # bytecode-debuginfo
//!
//! Compact debug information for bytecode: which source line, column and file an
//! instruction came from, which variables a lexical scope declares, and how to turn all of
//! that into a source map.
//!
//! ## Features
//!
//! - **Compact encoding** - Delta encoded signed LEB128 records, a few bytes per location
//! - **Two way queries** - Address to source position and source position to address
//! - **Lexical scopes** - Variable names and parent chains for scope inspection
//! - **Source maps** - Bytecode offsets exported as source map segments
//! - **Thread safe reader** - Immutable once built, queried from any number of threads
//!
//! ## Quick Start
//!
//! ```rust
//! use bytecode_debuginfo::prelude::*;
//!
//! let mut builder = DebugInfoBuilder::new();
//! let file = builder.add_filename("main.js");
//!
//! // function 0 starts at 1:1, instructions at 5 and 9 map to 2:3 and 2:7
//! let debug_offset = builder.append_source_locations(
//!     &SourceLocation::new(0, 1, 1, file),
//!     0,
//!     &[SourceLocation::new(5, 2, 3, file), SourceLocation::new(9, 2, 7, file)],
//! );
//! let info = builder.finalize();
//!
//! let location = info.get_location_for_address(debug_offset, 7)?.unwrap();
//! assert_eq!((location.line, location.column), (2, 3));
//! assert_eq!(info.filename_by_id(location.filename_id), Some("main.js"));
//! # Ok::<(), bytecode_debuginfo::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`encoding`] - Signed LEB128 codec and the bounds-checked [`Parser`]
//! - [`debuginfo`] - Record formats, [`DebugInfoBuilder`], [`DebugInfo`] and its queries
//! - [`debugger`] - Debugger attachment state consulted by runtime code
//! - [`prelude`] - Convenient re-exports
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events (record appends at `trace`,
//! finalization and reconstruction at `debug`, rejected data at `warn`). Install a
//! subscriber in the application to see them.
#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use bytecode_debuginfo::prelude::*;
///
/// let info = DebugInfoBuilder::new().finalize();
/// assert!(info.file_table().is_empty());
/// ```
pub mod prelude;

/// Varint codec shared by every encoded region.
///
/// # Key Types
///
/// - [`encoding::Parser`] - Bounds-checked cursor with signed LEB128 and string readers
/// - [`encoding::io::write_sleb128`] - Signed LEB128 writer
pub mod encoding;

/// Debug information records, builder, reader and exporters.
///
/// See the module documentation for the buffer layout.
pub mod debuginfo;

/// Debugger attachment state.
pub mod debugger;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
///
/// # Examples
///
/// ```rust
/// use bytecode_debuginfo::{DebugInfo, Result};
///
/// fn names_of(info: &DebugInfo, scope: u32) -> Result<usize> {
///     Ok(info.get_variable_names(scope)?.len())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `bytecode-debuginfo` Error type
///
/// The main error type for all fallible operations in this crate. Missing debug
/// information is not an error; queries report it as `Ok(None)`.
///
/// # Examples
///
/// ```rust
/// use bytecode_debuginfo::{DebugInfoBuilder, Error};
///
/// let info = DebugInfoBuilder::new().finalize();
/// match info.get_location_for_address(0, 0) {
///     Ok(Some(location)) => println!("line {}", location.line),
///     Ok(None) => println!("no debug info"),
///     Err(Error::InvalidOffset(offset)) => println!("offset {} is not a function", offset),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// Low-level parser for the encoded regions.
pub use encoding::Parser;

pub use debuginfo::{
    DebugInfo, DebugInfoBuilder, DebugInfoConfig, DebugSearchResult, DisassemblySections,
    FileTable, FileTableEntry, FilenameTable, SourceLocation, SourceMap,
};
