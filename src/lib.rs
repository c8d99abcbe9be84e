pub mod core;
pub mod errors;
pub mod input;
pub mod output;
pub mod population;

#[macro_use]
extern crate is_close;

pub use crate::core::encoding::{Barcode, Category, Individual, Layout, TechnologyPair};
pub use crate::core::generator::{IndividualGenerator, ReferenceGenerator};
pub use crate::core::overrides::{apply_manual_configuration, reset_to_reference};
pub use crate::core::resource_check::{allowed_capacity, enforce_resource_limit, ResourceOutcome};
pub use crate::core::resource_table::{BuildingList, ResourceTable, ResourceTables};
pub use crate::core::share_check::{check_shares, validate_and_repair, ShareCheck};
pub use crate::errors::RepairError;
pub use crate::input::RepairConfig;

use crate::output::Output;
use crate::population::{read_population, write_population};
use bitflags::bitflags;
use rayon::prelude::*;
use serde::Serialize;
use std::io::Read;
use tracing::info;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct RunFlags: u8 {
        const REFERENCE_SCENARIO = 0b01;
        const MANUAL_CONFIGURATION = 0b10;
    }
}

/// Counts of what a run did to the population.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RepairSummary {
    pub individuals: usize,
    pub resource_reduced: usize,
    pub resource_disabled: usize,
    pub replaced: usize,
}

impl RepairSummary {
    fn record(mut self, outcome: ResourceOutcome, replaced: bool) -> Self {
        self.individuals += 1;
        match outcome {
            ResourceOutcome::WithinLimit { .. } => {}
            ResourceOutcome::Reduced { .. } => self.resource_reduced += 1,
            ResourceOutcome::Disabled { .. } => self.resource_disabled += 1,
        }
        if replaced {
            self.replaced += 1;
        }
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            individuals: self.individuals + other.individuals,
            resource_reduced: self.resource_reduced + other.resource_reduced,
            resource_disabled: self.resource_disabled + other.resource_disabled,
            replaced: self.replaced + other.replaced,
        }
    }
}

/// Apply any scenario override, the resource limit and the share repair to one individual.
pub fn repair_individual(
    individual: &mut Individual,
    tables: &ResourceTables,
    config: &RepairConfig,
    nominal_capacity: f64,
    generator: &impl IndividualGenerator,
    flags: RunFlags,
) -> Result<(ResourceOutcome, bool), RepairError> {
    if flags.contains(RunFlags::REFERENCE_SCENARIO) {
        reset_to_reference(individual, config)?;
    } else if flags.contains(RunFlags::MANUAL_CONFIGURATION) {
        apply_manual_configuration(individual, config)?;
    }

    let outcome = enforce_resource_limit(
        individual,
        &tables.buildings,
        &tables.geothermal,
        nominal_capacity,
        config,
    )?;
    let replaced = validate_and_repair(individual, generator, config)?;

    Ok((outcome, replaced))
}

/// Repair every individual of a population and write the result to `output` under the
/// `repaired_population` key.
pub fn run_repair(
    population: impl Read,
    output: impl Output,
    tables: &ResourceTables,
    config: &RepairConfig,
    nominal_capacity: f64,
    generator: &impl IndividualGenerator,
    flags: RunFlags,
) -> anyhow::Result<RepairSummary> {
    let mut population = read_population(population, config.layout())?;
    info!(individuals = population.len(), "repairing population");

    let summary = population
        .par_iter_mut()
        .map(|individual| {
            repair_individual(individual, tables, config, nominal_capacity, generator, flags)
        })
        .try_fold(RepairSummary::default, |summary, result| {
            result.map(|(outcome, replaced)| summary.record(outcome, replaced))
        })
        .try_reduce(RepairSummary::default, |a, b| Ok(a.merge(b)))?;

    if !output.is_noop() {
        write_population(
            output.writer_for_location_key("repaired_population", "csv")?,
            &population,
        )?;
    }
    info!(?summary, "population repaired");

    Ok(summary)
}
