//! Validation configuration for reconstructing a reader from stored parts
//!
//! A [`crate::DebugInfoBuilder`] only ever produces well-formed data, so
//! [`crate::DebugInfoBuilder::finalize`] does not validate. Parts coming from elsewhere
//! (a file, the network, a cache) go through [`crate::DebugInfo::from_parts`], which checks
//! them according to this configuration.

/// Configuration for debug-info validation in [`crate::DebugInfo::from_parts`]
///
/// Point queries are bounds-checked regardless of these settings; disabling a check only
/// defers the error to the first query that touches the damaged record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct DebugInfoConfig {
    /// Check that file table entries are ordered, start inside the location stream and
    /// name filenames that exist (cheap, recommended: always true)
    pub verify_file_table: bool,

    /// Decode every function record of the location stream up front
    pub verify_location_stream: bool,

    /// Decode every lexical record up front
    pub verify_lexical_data: bool,

    /// Maximum number of records [`crate::DebugInfo::scope_chain`] follows (default: 256)
    pub max_scope_depth: usize,
}

impl Default for DebugInfoConfig {
    fn default() -> Self {
        Self {
            verify_file_table: true,
            verify_location_stream: false,
            verify_lexical_data: false,
            max_scope_depth: 256,
        }
    }
}

impl DebugInfoConfig {
    /// Creates a configuration that skips every up-front check
    ///
    /// **Warning**: Use only for parts this process wrote itself.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            verify_file_table: false,
            verify_location_stream: false,
            verify_lexical_data: false,
            max_scope_depth: 256,
        }
    }

    /// Creates a configuration that decodes everything before accepting the parts
    ///
    /// Cost is linear in the buffer size.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            verify_file_table: true,
            verify_location_stream: true,
            verify_lexical_data: true,
            max_scope_depth: 256,
        }
    }

    /// Returns a copy with a different scope chain depth limit
    #[must_use]
    pub fn with_max_scope_depth(mut self, max_scope_depth: usize) -> Self {
        self.max_scope_depth = max_scope_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DebugInfoConfig::default();
        assert!(config.verify_file_table);
        assert!(!config.verify_location_stream);
        assert!(!config.verify_lexical_data);
        assert_eq!(config.max_scope_depth, 256);
    }

    #[test]
    fn test_disabled_config() {
        let config = DebugInfoConfig::disabled();
        assert!(!config.verify_file_table);
        assert!(!config.verify_location_stream);
        assert!(!config.verify_lexical_data);
    }

    #[test]
    fn test_strict_config() {
        let config = DebugInfoConfig::strict();
        assert!(config.verify_file_table);
        assert!(config.verify_location_stream);
        assert!(config.verify_lexical_data);
    }

    #[test]
    fn test_with_max_scope_depth() {
        let config = DebugInfoConfig::strict().with_max_scope_depth(4);
        assert_eq!(config.max_scope_depth, 4);
        assert!(config.verify_location_stream);
    }
}
