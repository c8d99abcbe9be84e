#![no_main]

use libfuzzer_sys::fuzz_target;
use supply_repair::{validate_and_repair, Individual, ReferenceGenerator, RepairConfig};

fuzz_target!(|slots: Vec<f64>| {
    let config = RepairConfig::default();
    if let Ok(mut individual) = Individual::new(config.layout(), slots) {
        let _ = validate_and_repair(&mut individual, &ReferenceGenerator, &config);
    }
});
