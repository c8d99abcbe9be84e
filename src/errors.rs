use crate::core::encoding::Layout;
use thiserror::Error;

/// Data-integrity failures. Constraint violations on shares are repaired in place and never
/// surface as one of these.
#[derive(Debug, Error)]
pub enum RepairError {
    #[error("Building '{0}' is connected in the individual but has no entry in the resource table")]
    MissingBuilding(String),
    #[error("Individual encodes {found} buildings but the building list names {expected}")]
    BuildingCountMismatch { expected: usize, found: usize },
    #[error("Individual has {found} slots but its layout needs at least {expected}")]
    IndividualTooShort { expected: usize, found: usize },
    #[error("Individual has layout {found:?} but the configuration describes {expected:?}")]
    LayoutMismatch { expected: Layout, found: Layout },
    #[error("Generated individual has layout {found:?}, expected the structure of {expected:?}")]
    GeneratedLayoutMismatch { expected: Layout, found: Layout },
    #[error("Building connectivity slot {index} holds {value}, expected 0 or 1")]
    InvalidConnectivityFlag { index: usize, value: f64 },
    #[error("Resource area for building '{building}' must be finite and non-negative, got {area}")]
    InvalidResourceArea { building: String, area: f64 },
    #[error("Nominal capacity must be positive, got {0}")]
    NonPositiveNominalCapacity(f64),
    #[error("Unknown technology '{0}'")]
    UnknownTechnology(String),
    #[error("Invalid repair configuration: {0}")]
    InvalidConfiguration(String),
}
