#![no_main]

use bytecode_debuginfo::{
    DebugInfo, DebugInfoConfig, DisassemblySections, FileTableEntry, FilenameTable, SourceMap,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let lexical_start = u32::from(data[0]).min((data.len() - 2) as u32);
    let buffer = data[2..].to_vec();
    let filenames: FilenameTable = ["a.js", "b.js"].into_iter().collect();
    let files = vec![
        FileTableEntry { from_offset: 0, filename_id: 0, source_mapping_url_id: 0 },
        FileTableEntry { from_offset: u32::from(data[1]), filename_id: 1, source_mapping_url_id: 0 },
    ];

    let Ok(info) = DebugInfo::from_parts(filenames, files, lexical_start, buffer, DebugInfoConfig::disabled())
    else {
        return;
    };

    for offset in 0..info.lexical_start().min(16) {
        let _ = info.get_location_for_address(offset, u32::MAX);
    }
    let _ = info.get_address_for_location(0, 1, None);
    let _ = info.get_address_for_location(1, 1, Some(1));
    let _ = info.get_variable_names(0);
    let _ = info.scope_chain(0, |id| Some(id));
    let _ = info.disassemble(DisassemblySections::all());
    let _ = info.emit_source_map(&mut SourceMap::new(), &[0; 256], 0);
});
