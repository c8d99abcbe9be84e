use crate::core::encoding::{Category, Individual, TechnologyPair};
use crate::errors::RepairError;
use crate::input::RepairConfig;

/// Put an individual into the reference scenario: every building connected to the district
/// network and heated by the reference technology alone.
pub fn reset_to_reference(
    individual: &mut Individual,
    config: &RepairConfig,
) -> Result<(), RepairError> {
    individual.ensure_layout(&config.layout())?;
    let reference = config.roles()?.reference;

    individual.clear_fixed_slots();
    individual.connect_all_buildings();
    individual.set_pair(
        Category::Heating,
        reference,
        TechnologyPair {
            active: 1.,
            share: 1.,
        },
    );

    Ok(())
}

/// Overwrite an individual with the configuration's manual scenario, used to inspect the
/// results of one specific configuration.
pub fn apply_manual_configuration(
    individual: &mut Individual,
    config: &RepairConfig,
) -> Result<(), RepairError> {
    individual.ensure_layout(&config.layout())?;
    let manual = &config.manual_configuration;

    // resolve every name before touching the individual
    let heating = manual
        .heating
        .iter()
        .map(|(name, &share)| Ok((config.technology_index(Category::Heating, name)?, share)))
        .collect::<Result<Vec<_>, RepairError>>()?;
    let solar = manual
        .solar
        .iter()
        .map(|(name, &share)| Ok((config.technology_index(Category::Solar, name)?, share)))
        .collect::<Result<Vec<_>, RepairError>>()?;

    individual.clear_fixed_slots();
    for (category, assignments) in [(Category::Heating, heating), (Category::Solar, solar)] {
        for (index, share) in assignments {
            individual.set_pair(category, index, TechnologyPair { active: 1., share });
        }
    }
    if manual.connect_all_buildings {
        individual.connect_all_buildings();
    }

    Ok(())
}
