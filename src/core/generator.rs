use crate::core::encoding::Individual;
use crate::core::overrides::reset_to_reference;
use crate::errors::RepairError;
use crate::input::RepairConfig;

/// Source of brand-new individuals, used when an individual cannot be repaired locally.
///
/// Output is trusted to satisfy every share constraint and is not re-validated.
pub trait IndividualGenerator: Sync {
    fn generate(
        &self,
        building_count: usize,
        config: &RepairConfig,
    ) -> Result<Individual, RepairError>;
}

impl<F> IndividualGenerator for F
where
    F: Fn(usize, &RepairConfig) -> Result<Individual, RepairError> + Sync,
{
    fn generate(
        &self,
        building_count: usize,
        config: &RepairConfig,
    ) -> Result<Individual, RepairError> {
        self(building_count, config)
    }
}

/// Generates the reference scenario: every building connected and the reference technology
/// supplying all of the heat.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceGenerator;

impl IndividualGenerator for ReferenceGenerator {
    fn generate(
        &self,
        building_count: usize,
        config: &RepairConfig,
    ) -> Result<Individual, RepairError> {
        let mut individual = Individual::zeroed(config.layout(), building_count);
        reset_to_reference(&mut individual, config)?;

        Ok(individual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoding::Category;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_reference_generator_output_is_balanced() {
        let config = RepairConfig::default();
        let individual = ReferenceGenerator.generate(4, &config).unwrap();

        assert_eq!(individual.building_count(), 4);
        assert_eq!(individual.active_share_sum(Category::Heating), 1.);
        assert!(!individual.any_active(Category::Solar));
        assert_eq!(individual.building_flags(), &[1.; 4]);
    }

    #[rstest]
    fn test_closures_are_generators() {
        let config = RepairConfig::default();
        let generator = |count: usize, config: &RepairConfig| -> Result<Individual, RepairError> {
            Ok(Individual::zeroed(config.layout(), count))
        };
        assert_eq!(generator.generate(2, &config).unwrap().building_count(), 2);
    }
}
