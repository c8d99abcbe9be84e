use crate::core::encoding::{Category, Individual};
use crate::core::generator::IndividualGenerator;
use crate::errors::RepairError;
use crate::input::RepairConfig;
use tracing::{info, instrument, warn};

/// Share totals found after local repairs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShareCheck {
    pub heating_sum: f64,
    /// `None` when no solar technology is active
    pub solar_sum: Option<f64>,
    pub heating_valid: bool,
    pub solar_valid: bool,
}

impl ShareCheck {
    pub fn is_valid(&self) -> bool {
        self.heating_valid && self.solar_valid
    }
}

/// Raise every active heating share below the minimum to exactly the minimum, shrinking the
/// other active heating shares in proportion so the total is unchanged.
///
/// Returns the number of technologies raised.
pub fn enforce_minimum_shares(individual: &mut Individual, config: &RepairConfig) -> usize {
    let heating_count = individual.layout().heating_count();
    let mut raised = 0;

    for index in 0..heating_count {
        let pair = individual.heating(index);
        if !pair.is_active() || pair.share >= config.minimum_share {
            continue;
        }
        info!(
            technology = config.technology_name(Category::Heating, index),
            share = pair.share,
            "share too low, raised to minimum"
        );
        let old_share = pair.share;
        let share_gain = config.minimum_share - old_share;
        individual.set_share(Category::Heating, index, config.minimum_share);

        for rank in (0..heating_count).filter(|&rank| rank != index) {
            let other = individual.heating(rank);
            if other.is_active() {
                individual.set_share(
                    Category::Heating,
                    rank,
                    other.share - other.share / (1. - old_share) * share_gain,
                );
            }
        }
        raised += 1;
    }

    raised
}

/// Set negative solar shares to zero. The other solar shares are left as they are.
///
/// Returns the number of shares clamped.
pub fn clamp_negative_solar_shares(individual: &mut Individual, config: &RepairConfig) -> usize {
    let mut clamped = 0;
    for index in 0..individual.layout().solar_count() {
        let share = individual.solar(index).share;
        if share < 0. {
            info!(
                technology = config.technology_name(Category::Solar, index),
                share,
                "negative solar share set to zero"
            );
            individual.set_share(Category::Solar, index, 0.);
            clamped += 1;
        }
    }

    clamped
}

/// Check that active heating shares sum to one and, when any solar technology is active,
/// that active solar shares do too.
pub fn check_share_sums(individual: &Individual, config: &RepairConfig) -> ShareCheck {
    let heating_sum = individual.active_share_sum(Category::Heating);
    let heating_valid = is_close!(heating_sum, 1., abs_tol = config.share_tolerance);
    if !heating_valid {
        info!(heating_sum, "wrong heating share total");
    }

    let solar_sum = individual
        .any_active(Category::Solar)
        .then(|| individual.active_share_sum(Category::Solar));
    let solar_valid =
        solar_sum.map_or(true, |sum| is_close!(sum, 1., abs_tol = config.share_tolerance));
    if !solar_valid {
        info!(?solar_sum, "wrong solar share total");
    }

    ShareCheck {
        heating_sum,
        solar_sum,
        heating_valid,
        solar_valid,
    }
}

/// Local repair phase: minimum shares, negative solar clamp and the global total checks.
pub fn check_shares(individual: &mut Individual, config: &RepairConfig) -> ShareCheck {
    enforce_minimum_shares(individual, config);
    clamp_negative_solar_shares(individual, config);
    check_share_sums(individual, config)
}

/// Repair an individual's shares in place. When the local repairs cannot balance the
/// totals, the heating, heat-recovery and solar slots are replaced by those of a freshly
/// generated individual with the same number of buildings.
///
/// Returns whether the individual was replaced.
#[instrument(skip_all, fields(buildings = individual.building_count()))]
pub fn validate_and_repair(
    individual: &mut Individual,
    generator: &impl IndividualGenerator,
    config: &RepairConfig,
) -> Result<bool, RepairError> {
    individual.ensure_layout(&config.layout())?;
    if check_shares(individual, config).is_valid() {
        return Ok(false);
    }

    warn!("invalid individual, replacing its technology slots with a generated one");
    let replacement = generator.generate(individual.building_count(), config)?;
    individual.splice_structural_segment(&replacement)?;

    Ok(true)
}
