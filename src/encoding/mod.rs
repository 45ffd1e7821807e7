//! Varint codec shared by every encoded debug-info region.
//!
//! - [`io`] - signed LEB128 and length-prefixed string writers
//! - [`parser`] - the bounds-checked [`Parser`] cursor used by all decoders

pub mod io;
pub mod parser;

pub use parser::Parser;
