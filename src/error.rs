use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Absent debug information is not an error: point queries that find no matching record
/// return `Ok(None)`. The variants below describe corrupt encoded data or invalid arguments
/// handed to the reader.
///
/// # Error Categories
///
/// ## Encoded Data Errors
/// - [`Error::Malformed`] - Corrupted or invalid encoded structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a region
/// - [`Error::InvalidOffset`] - A debug offset that does not point into the location stream
///
/// ## Query Errors
/// - [`Error::MissingFunctionOffset`] - Source map emission lacks a function's file offset
/// - [`Error::RecursionLimit`] - Lexical scope chain exceeded the configured depth
///
/// ## Output Errors
/// - [`Error::Format`] - The disassembly sink refused a write
///
/// # Examples
///
/// ```rust
/// use bytecode_debuginfo::{DebugInfoBuilder, Error};
///
/// let info = DebugInfoBuilder::new().finalize();
/// match info.get_variable_names(42) {
///     Ok(names) => println!("{} names", names.len()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Corrupt debug info: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The encoded debug information is damaged and could not be decoded.
    ///
    /// The error includes the source location where the malformation was detected
    /// for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while decoding.
    ///
    /// Raised when a varint, string or record runs past the end of the region being
    /// decoded. It's a safety check to prevent buffer overruns on truncated data.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The given debug offset does not point into the location-stream region.
    #[error("Debug offset {0} is outside of the location stream")]
    InvalidOffset(u32),

    /// Source map emission found a function with no entry in the function offset table.
    #[error("No file offset provided for function {0}")]
    MissingFunctionOffset(u32),

    /// Recursion limit reached.
    ///
    /// Walking a lexical scope chain is bounded, a cyclic or very deep chain stops here.
    /// The associated value shows the limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// Writing disassembly output failed.
    #[error("{0}")]
    Format(#[from] std::fmt::Error),
}
