#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io;
use std::io::{BufReader, Cursor, Write};
use supply_repair::output::Output;
use supply_repair::{
    run_repair, BuildingList, ReferenceGenerator, RepairConfig, ResourceTable, ResourceTables,
    RunFlags,
};

fuzz_target!(|data: &[u8]| {
    let tables = ResourceTables {
        buildings: BuildingList::new(vec!["B1".to_string(), "B2".to_string()]),
        geothermal: ResourceTable::from_areas([("B1".to_string(), 120.), ("B2".to_string(), 0.)]),
    };
    let _run = run_repair(
        BufReader::new(Cursor::new(data)),
        SinkOutput,
        &tables,
        &RepairConfig::default(),
        1e5,
        &ReferenceGenerator,
        RunFlags::empty(),
    );
});

/// An output that discards everything written to it.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        // pretend to be a real output so the population writer is fuzzed too
        false
    }
}
