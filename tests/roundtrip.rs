//! Property tests: whatever the builder is given comes back out of the reader.

use bytecode_debuginfo::{
    debuginfo::FunctionRecord, DebugInfo, DebugInfoBuilder, DebugInfoConfig, SourceLocation,
};
use proptest::prelude::*;

/// One function: start line/column plus `(address step, line, column, statement)` entries.
#[derive(Debug, Clone)]
struct Function {
    line: u32,
    column: u32,
    filename_id: u32,
    entries: Vec<(u32, u32, u32, u32)>,
}

impl Function {
    fn start(&self) -> SourceLocation {
        SourceLocation::new(0, self.line, self.column, self.filename_id)
    }

    /// Locations with strictly increasing addresses starting after the function start.
    fn locations(&self) -> Vec<SourceLocation> {
        let mut address = 0;
        self.entries
            .iter()
            .map(|&(step, line, column, statement)| {
                address += step;
                SourceLocation::new(address, line, column, self.filename_id)
                    .with_statement(statement)
            })
            .collect()
    }
}

fn function_strategy() -> impl Strategy<Value = Function> {
    (
        0u32..1 << 20,
        0u32..1 << 12,
        0u32..3,
        prop::collection::vec(
            (1u32..1000, 0u32..1 << 20, 0u32..1 << 12, 0u32..1 << 16),
            1..24,
        ),
    )
        .prop_map(|(line, column, filename_id, entries)| Function {
            line,
            column,
            filename_id,
            entries,
        })
}

fn build(functions: &[Function]) -> (DebugInfo, Vec<u32>) {
    let mut builder = DebugInfoBuilder::new();
    for name in ["a.js", "b.js", "c.js"] {
        builder.add_filename(name);
    }

    let offsets = functions
        .iter()
        .enumerate()
        .map(|(index, function)| {
            builder.append_source_locations(&function.start(), index as u32, &function.locations())
        })
        .collect();

    (builder.finalize(), offsets)
}

proptest! {
    #[test]
    fn locations_round_trip(functions in prop::collection::vec(function_strategy(), 1..12)) {
        let (info, offsets) = build(&functions);

        for (index, (function, &offset)) in functions.iter().zip(&offsets).enumerate() {
            let record = FunctionRecord::decode(info.location_data(), offset as usize).unwrap();
            prop_assert_eq!(record.function_index, index as u32);
            prop_assert_eq!((record.start.line, record.start.column), (function.line, function.column));

            let decoded: Vec<_> = record
                .locations
                .iter()
                .map(|(_, l)| (l.address, l.line, l.column, l.statement))
                .collect();
            let expected: Vec<_> = function
                .locations()
                .iter()
                .map(|l| (l.address, l.line, l.column, l.statement))
                .collect();
            prop_assert_eq!(decoded, expected);
        }
    }

    #[test]
    fn lookup_at_each_address_returns_that_location(
        functions in prop::collection::vec(function_strategy(), 1..8)
    ) {
        let (info, offsets) = build(&functions);

        for (function, &offset) in functions.iter().zip(&offsets) {
            for location in function.locations() {
                let found = info
                    .get_location_for_address(offset, location.address)
                    .unwrap()
                    .unwrap();
                prop_assert_eq!(found.line, location.line);
                prop_assert_eq!(found.column, location.column);
                prop_assert_eq!(found.statement, location.statement);
                prop_assert_eq!(found.filename_id, function.filename_id);
            }
        }
    }

    #[test]
    fn lookup_between_addresses_picks_preceding(
        function in function_strategy(),
        probe in 0u32..30_000,
    ) {
        let (info, offsets) = build(std::slice::from_ref(&function));
        let found = info.get_location_for_address(offsets[0], probe).unwrap().unwrap();

        let expected = function
            .locations()
            .into_iter()
            .filter(|l| l.address <= probe)
            .last()
            .unwrap_or_else(|| function.start());
        prop_assert_eq!(found.address, probe);
        prop_assert_eq!((found.line, found.column), (expected.line, expected.column));
    }

    #[test]
    fn scopes_round_trip(
        scopes in prop::collection::vec(
            (prop::option::of(0u32..1000), prop::collection::vec("[a-z_$][a-z0-9_]{0,12}", 0..6)),
            1..16,
        )
    ) {
        let mut builder = DebugInfoBuilder::new();
        let offsets: Vec<_> = scopes
            .iter()
            .map(|(parent, names)| builder.append_lexical_data(*parent, names))
            .collect();
        let info = builder.finalize();

        for ((parent, names), offset) in scopes.iter().zip(offsets) {
            prop_assert_eq!(info.get_parent_function_id(offset).unwrap(), *parent);
            prop_assert_eq!(info.get_variable_names(offset).unwrap(), names.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }

    #[test]
    fn stored_parts_reload_strictly(functions in prop::collection::vec(function_strategy(), 0..6)) {
        let (info, _) = build(&functions);
        let reloaded = DebugInfo::from_parts(
            info.filenames().clone(),
            info.file_table().entries().to_vec(),
            info.lexical_start(),
            info.data().to_vec(),
            DebugInfoConfig::strict(),
        );
        prop_assert!(reloaded.is_ok());
    }
}
