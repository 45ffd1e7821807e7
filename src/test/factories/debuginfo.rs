//! Debug info factories shared by the unit tests.

use crate::debuginfo::{DebugInfo, DebugInfoBuilder, SourceLocation};

/// Ids and offsets handed out while building [`sample_debug_info`].
#[derive(Debug, Clone, Copy)]
pub struct SampleIds {
    pub main_file: u32,
    pub helper_file: u32,
    pub main_offset: u32,
    pub helper_offset: u32,
    pub outer_scope: u32,
    pub inner_scope: u32,
}

/// Two functions in two files plus two scope records.
///
/// - function 0 in `main.js`: starts at 1:1, locations at 5 (2:3) and 9 (2:7)
/// - function 1 in `helper.js`: starts at 10:1, location at 3 (11:5, statement 1)
/// - outer scope `["a", "b"]` without parent, inner scope `["c"]` with parent function 0
pub fn sample_debug_info() -> (DebugInfo, SampleIds) {
    let mut builder = DebugInfoBuilder::new();
    let main_file = builder.add_filename("main.js");
    let helper_file = builder.add_filename("helper.js");

    let main_offset = builder.append_source_locations(
        &SourceLocation::new(0, 1, 1, main_file),
        0,
        &[
            SourceLocation::new(5, 2, 3, main_file),
            SourceLocation::new(9, 2, 7, main_file),
        ],
    );
    let helper_offset = builder.append_source_locations(
        &SourceLocation::new(0, 10, 1, helper_file),
        1,
        &[SourceLocation::new(3, 11, 5, helper_file).with_statement(1)],
    );

    let outer_scope = builder.append_lexical_data(None, &["a", "b"]);
    let inner_scope = builder.append_lexical_data(Some(0), &["c"]);

    let ids = SampleIds {
        main_file,
        helper_file,
        main_offset,
        helper_offset,
        outer_scope,
        inner_scope,
    };

    (builder.finalize(), ids)
}

/// Debug info whose only function changes file halfway.
///
/// Function 0 starts in `a.js` at 1:1; address 4 is still `a.js` (2:1), address 8 is in
/// `b.js` (7:2). `a.js.map` is the source mapping url of the start location.
pub fn split_file_debug_info() -> DebugInfo {
    let mut builder = DebugInfoBuilder::new();
    let a = builder.add_filename("a.js");
    let b = builder.add_filename("b.js");
    let url = builder.add_filename("a.js.map");

    builder.append_source_locations(
        &SourceLocation::new(0, 1, 1, a).with_source_mapping_url(url),
        0,
        &[SourceLocation::new(4, 2, 1, a), SourceLocation::new(8, 7, 2, b)],
    );

    builder.finalize()
}
