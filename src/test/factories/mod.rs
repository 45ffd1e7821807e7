pub mod debuginfo;

pub use debuginfo::*;
