use crate::core::encoding::{Barcode, Category, Individual, TechnologyPair};
use crate::core::resource_table::{BuildingList, ResourceTable};
use crate::errors::RepairError;
use crate::input::{GroundSourceParameters, RepairConfig};
use tracing::{debug, info};

/// What the resource check did to an individual.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResourceOutcome {
    WithinLimit {
        allowed_capacity: f64,
    },
    Reduced {
        allowed_capacity: f64,
        share_loss: f64,
    },
    Disabled {
        allowed_capacity: f64,
        share_loss: f64,
    },
}

impl ResourceOutcome {
    pub fn allowed_capacity(&self) -> f64 {
        match self {
            ResourceOutcome::WithinLimit { allowed_capacity }
            | ResourceOutcome::Reduced {
                allowed_capacity, ..
            }
            | ResourceOutcome::Disabled {
                allowed_capacity, ..
            } => *allowed_capacity,
        }
    }

    pub fn modified(&self) -> bool {
        !matches!(self, ResourceOutcome::WithinLimit { .. })
    }
}

/// Capacity (in W) that boreholes on the connected buildings' ground could deliver.
///
/// Each connected building contributes `ceil(area / module_area)` boreholes of
/// `module_max_capacity` each.
pub fn allowed_capacity(
    barcode: &Barcode,
    buildings: &BuildingList,
    table: &ResourceTable,
    parameters: &GroundSourceParameters,
) -> Result<f64, RepairError> {
    if barcode.len() != buildings.len() {
        return Err(RepairError::BuildingCountMismatch {
            expected: buildings.len(),
            found: barcode.len(),
        });
    }

    barcode
        .iter()
        .zip(buildings.iter())
        .filter(|(connected, _)| *connected)
        .map(|(_, building)| {
            table.area(building).map(|area| {
                (area / parameters.module_area).ceil() * parameters.module_max_capacity
            })
        })
        .sum()
}

/// Limit the share of the resource-constrained technology to what the connected buildings'
/// ground can supply, handing the lost share to the other active heating technologies in
/// proportion to their current shares.
///
/// Arguments:
/// * `individual` - the individual to modify in place
/// * `buildings` - building names in connectivity flag order
/// * `table` - available ground area per building
/// * `nominal_capacity` - nominal installed capacity of the district heating plant, in W
/// * `config` - technology configuration
pub fn enforce_resource_limit(
    individual: &mut Individual,
    buildings: &BuildingList,
    table: &ResourceTable,
    nominal_capacity: f64,
    config: &RepairConfig,
) -> Result<ResourceOutcome, RepairError> {
    // also rejects NaN
    if !(nominal_capacity > 0.) {
        return Err(RepairError::NonPositiveNominalCapacity(nominal_capacity));
    }
    individual.ensure_layout(&config.layout())?;
    let roles = config.roles()?;
    let constrained = roles.resource_constrained;

    let barcode = individual.barcode()?;
    let allowed = allowed_capacity(&barcode, buildings, table, &config.ground_source)?;
    let old_share = individual.heating(constrained).share;
    debug!(allowed_capacity = allowed, requested_capacity = old_share * nominal_capacity, %barcode);

    if allowed >= old_share * nominal_capacity {
        return Ok(ResourceOutcome::WithinLimit {
            allowed_capacity: allowed,
        });
    }

    let (outcome, new_share) = if allowed < config.disable_threshold {
        individual.set_pair(
            Category::Heating,
            constrained,
            TechnologyPair {
                active: 0.,
                share: 0.,
            },
        );
        (
            ResourceOutcome::Disabled {
                allowed_capacity: allowed,
                share_loss: old_share,
            },
            0.,
        )
    } else {
        let new_share = allowed / nominal_capacity;
        individual.set_share(Category::Heating, constrained, new_share);
        (
            ResourceOutcome::Reduced {
                allowed_capacity: allowed,
                share_loss: old_share - new_share,
            },
            new_share,
        )
    };
    info!(
        technology = %config.resource_constrained_technology,
        old_share, new_share, "resource-constrained share modified"
    );

    let share_loss = old_share - new_share;
    let remaining = 1. - old_share;
    let others = (0..individual.layout().heating_count())
        .filter(|&index| index != constrained && individual.heating(index).is_active())
        .collect::<Vec<_>>();

    if others.is_empty() || remaining <= f64::EPSILON {
        // nothing to scale up, so the baseline technology covers the rest
        individual.set_pair(
            Category::Heating,
            roles.baseline,
            TechnologyPair {
                active: 1.,
                share: 1. - new_share,
            },
        );
        info!(
            technology = %config.baseline_technology,
            share = 1. - new_share,
            "baseline technology activated"
        );
    } else {
        for index in others {
            let share = individual.heating(index).share;
            individual.set_share(
                Category::Heating,
                index,
                share + share * share_loss / remaining,
            );
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn config() -> RepairConfig {
        RepairConfig {
            heating_technologies: vec!["Boiler".into(), "GHP".into()],
            heat_recovery_slots: 0,
            solar_technologies: vec!["PV".into()],
            trailing_slots: 0,
            baseline_technology: "Boiler".into(),
            reference_technology: "Boiler".into(),
            ground_source: GroundSourceParameters {
                module_area: 50.,
                module_max_capacity: 10.,
            },
            ..Default::default()
        }
    }

    #[fixture]
    fn buildings() -> BuildingList {
        BuildingList::new(vec!["B1".into(), "B2".into()])
    }

    #[fixture]
    fn table() -> ResourceTable {
        ResourceTable::from_areas([("B1".to_string(), 100.), ("B2".to_string(), 0.)])
    }

    fn individual(config: &RepairConfig, slots: Vec<f64>) -> Individual {
        Individual::new(config.layout(), slots).unwrap()
    }

    #[rstest]
    fn test_allowed_capacity_counts_whole_boreholes(config: RepairConfig, buildings: BuildingList) {
        let table = ResourceTable::from_areas([("B1".to_string(), 101.), ("B2".to_string(), 20.)]);
        let ind = individual(&config, vec![1., 1., 0., 0., 0., 0., 1., 1.]);
        let allowed = allowed_capacity(
            &ind.barcode().unwrap(),
            &buildings,
            &table,
            &config.ground_source,
        )
        .unwrap();
        // ceil(101 / 50) * 10 + ceil(20 / 50) * 10
        assert_eq!(allowed, 40.);
    }

    #[rstest]
    fn test_disconnected_buildings_do_not_count(
        config: RepairConfig,
        buildings: BuildingList,
        table: ResourceTable,
    ) {
        let ind = individual(&config, vec![1., 1., 0., 0., 0., 0., 0., 1.]);
        let allowed = allowed_capacity(
            &ind.barcode().unwrap(),
            &buildings,
            &table,
            &config.ground_source,
        )
        .unwrap();
        assert_eq!(allowed, 0.);
    }

    #[rstest]
    fn test_share_reduced_to_allowed_capacity(
        config: RepairConfig,
        buildings: BuildingList,
        table: ResourceTable,
    ) {
        let mut ind = individual(&config, vec![1., 0.5, 1., 0.5, 0., 0., 1., 0.]);
        let outcome = enforce_resource_limit(&mut ind, &buildings, &table, 100., &config).unwrap();

        assert!(matches!(outcome, ResourceOutcome::Reduced { .. }));
        assert_eq!(outcome.allowed_capacity(), 20.);
        assert_relative_eq!(ind.heating(1).share, 0.2, epsilon = 1e-12);
        assert_eq!(ind.heating(1).active, 1.);
        assert_relative_eq!(ind.heating(0).share, 0.8, epsilon = 1e-12);
        assert_relative_eq!(ind.active_share_sum(Category::Heating), 1., epsilon = 1e-3);
    }

    #[rstest]
    fn test_unchanged_when_capacity_suffices(
        config: RepairConfig,
        buildings: BuildingList,
        table: ResourceTable,
    ) {
        let mut ind = individual(&config, vec![1., 0.8, 1., 0.2, 0., 0., 1., 0.]);
        let before = ind.clone();
        let outcome = enforce_resource_limit(&mut ind, &buildings, &table, 100., &config).unwrap();

        assert_eq!(
            outcome,
            ResourceOutcome::WithinLimit {
                allowed_capacity: 20.
            }
        );
        assert!(!outcome.modified());
        assert_eq!(ind, before);
    }

    #[rstest]
    fn test_sole_constrained_technology_replaced_by_baseline(
        config: RepairConfig,
        buildings: BuildingList,
        table: ResourceTable,
    ) {
        let mut ind = individual(&config, vec![0., 0., 1., 1., 0., 0., 0., 1.]);
        let outcome = enforce_resource_limit(&mut ind, &buildings, &table, 100., &config).unwrap();

        assert_eq!(
            outcome,
            ResourceOutcome::Disabled {
                allowed_capacity: 0.,
                share_loss: 1.
            }
        );
        assert_eq!(ind.heating(1), TechnologyPair { active: 0., share: 0. });
        assert_eq!(ind.heating(0), TechnologyPair { active: 1., share: 1. });
    }

    #[rstest]
    fn test_sole_constrained_technology_partially_kept(
        config: RepairConfig,
        buildings: BuildingList,
        table: ResourceTable,
    ) {
        let mut ind = individual(&config, vec![0., 0., 1., 1., 0., 0., 1., 0.]);
        enforce_resource_limit(&mut ind, &buildings, &table, 100., &config).unwrap();

        assert_relative_eq!(ind.heating(1).share, 0.2, epsilon = 1e-12);
        assert_eq!(ind.heating(0).active, 1.);
        assert_relative_eq!(ind.heating(0).share, 0.8, epsilon = 1e-12);
    }

    #[rstest]
    fn test_disabled_share_goes_to_other_active_technologies() {
        let config = RepairConfig::default();
        let buildings = BuildingList::new(vec!["B1".into()]);
        let table = ResourceTable::from_areas([("B1".to_string(), 0.)]);
        let mut slots = vec![0.; config.layout().len_for(1)];
        // CHP 0.3, peak boiler 0.3, GHP 0.4
        slots[0] = 1.;
        slots[1] = 0.3;
        slots[4] = 1.;
        slots[5] = 0.3;
        slots[10] = 1.;
        slots[11] = 0.4;
        slots[21] = 1.;
        let mut ind = individual(&config, slots);

        let outcome = enforce_resource_limit(&mut ind, &buildings, &table, 1e6, &config).unwrap();

        assert!(matches!(outcome, ResourceOutcome::Disabled { .. }));
        assert_eq!(ind.heating(5), TechnologyPair { active: 0., share: 0. });
        assert_relative_eq!(ind.heating(0).share, 0.5, epsilon = 1e-12);
        assert_relative_eq!(ind.heating(2).share, 0.5, epsilon = 1e-12);
        assert!(!ind.heating(1).is_active());
    }

    #[rstest]
    fn test_whole_share_reduced_with_zero_share_others_goes_to_baseline() {
        let config = RepairConfig::default();
        let buildings = BuildingList::new(vec!["B1".into()]);
        let table = ResourceTable::from_areas([("B1".to_string(), 100.)]);
        let mut slots = vec![0.; config.layout().len_for(1)];
        // CHP active with a zero share, GHP 1.0
        slots[0] = 1.;
        slots[10] = 1.;
        slots[11] = 1.;
        slots[21] = 1.;
        let mut ind = individual(&config, slots);

        let outcome = enforce_resource_limit(&mut ind, &buildings, &table, 1e5, &config).unwrap();

        // four boreholes of 2000 W
        assert_eq!(outcome.allowed_capacity(), 8000.);
        assert!(matches!(outcome, ResourceOutcome::Reduced { .. }));
        assert_relative_eq!(ind.heating(5).share, 0.08, epsilon = 1e-12);
        assert_eq!(ind.heating(1).active, 1.);
        assert_relative_eq!(ind.heating(1).share, 0.92, epsilon = 1e-12);
        assert_eq!(ind.heating(0), TechnologyPair { active: 1., share: 0. });
    }

    #[rstest]
    fn test_individual_of_other_layout_is_rejected(
        config: RepairConfig,
        buildings: BuildingList,
        table: ResourceTable,
    ) {
        let mut ind = Individual::zeroed(RepairConfig::default().layout(), 2);
        assert!(matches!(
            enforce_resource_limit(&mut ind, &buildings, &table, 100., &config),
            Err(RepairError::LayoutMismatch { .. })
        ));
    }

    #[rstest]
    fn test_missing_building_is_fatal(config: RepairConfig, buildings: BuildingList) {
        let table = ResourceTable::from_areas([("B1".to_string(), 100.)]);
        let mut ind = individual(&config, vec![1., 0.5, 1., 0.5, 0., 0., 0., 1.]);
        assert!(matches!(
            enforce_resource_limit(&mut ind, &buildings, &table, 100., &config),
            Err(RepairError::MissingBuilding(_))
        ));
    }

    #[rstest]
    fn test_building_count_mismatch_is_fatal(config: RepairConfig, table: ResourceTable) {
        let buildings = BuildingList::new(vec!["B1".into()]);
        let mut ind = individual(&config, vec![1., 0.5, 1., 0.5, 0., 0., 1., 0.]);
        assert!(matches!(
            enforce_resource_limit(&mut ind, &buildings, &table, 100., &config),
            Err(RepairError::BuildingCountMismatch {
                expected: 1,
                found: 2
            })
        ));
    }

    #[rstest]
    #[case(0.)]
    #[case(-5.)]
    #[case(f64::NAN)]
    fn test_rejects_non_positive_nominal_capacity(
        #[case] nominal_capacity: f64,
        config: RepairConfig,
        buildings: BuildingList,
        table: ResourceTable,
    ) {
        let mut ind = individual(&config, vec![1., 0.5, 1., 0.5, 0., 0., 1., 0.]);
        assert!(matches!(
            enforce_resource_limit(&mut ind, &buildings, &table, nominal_capacity, &config),
            Err(RepairError::NonPositiveNominalCapacity(_))
        ));
    }
}
