use crate::core::encoding::{Category, Layout};
use crate::errors::RepairError;
use anyhow::anyhow;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::io::Read;

pub fn ingest_config(json: impl Read) -> anyhow::Result<RepairConfig> {
    RepairConfig::from_json(json)
}

/// Technology counts, physical parameters and thresholds used by every repair operation.
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct RepairConfig {
    #[validate(min_items = 1)]
    pub heating_technologies: Vec<String>,
    pub heat_recovery_slots: usize,
    pub solar_technologies: Vec<String>,
    /// scalar slots between the solar pairs and the building flags (total solar area)
    pub trailing_slots: usize,
    pub resource_constrained_technology: String,
    /// activated when the resource-constrained technology was the only active heating technology
    pub baseline_technology: String,
    /// the single technology of the reference scenario
    pub reference_technology: String,
    #[validate]
    pub ground_source: GroundSourceParameters,
    #[validate(exclusive_minimum = 0.)]
    #[validate(exclusive_maximum = 1.)]
    pub minimum_share: f64,
    #[validate(exclusive_minimum = 0.)]
    pub share_tolerance: f64,
    #[validate(minimum = 0.)]
    pub disable_threshold: f64,
    pub manual_configuration: ManualConfiguration,
}

/// Borehole sizing for the ground-source heat pump.
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct GroundSourceParameters {
    /// ground area occupied by one borehole, in m2
    #[validate(exclusive_minimum = 0.)]
    pub module_area: f64,
    /// maximum thermal capacity of one borehole, in W
    #[validate(minimum = 0.)]
    pub module_max_capacity: f64,
}

/// A fixed configuration applied to individuals when manually checking a scenario.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct ManualConfiguration {
    pub heating: IndexMap<String, f64>,
    pub solar: IndexMap<String, f64>,
    pub connect_all_buildings: bool,
}

impl Default for ManualConfiguration {
    fn default() -> Self {
        Self {
            heating: IndexMap::from([("PeakBoiler".to_string(), 1.)]),
            solar: IndexMap::new(),
            connect_all_buildings: true,
        }
    }
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            heating_technologies: [
                "CHP",
                "BaseBoiler",
                "PeakBoiler",
                "HPLake",
                "HPSewage",
                "GHP",
            ]
            .map(String::from)
            .to_vec(),
            heat_recovery_slots: 2,
            solar_technologies: ["PV", "PVT", "SC"].map(String::from).to_vec(),
            trailing_slots: 1,
            resource_constrained_technology: "GHP".to_string(),
            baseline_technology: "BaseBoiler".to_string(),
            reference_technology: "PeakBoiler".to_string(),
            ground_source: GroundSourceParameters {
                module_area: 25.,
                module_max_capacity: 2000.,
            },
            minimum_share: 0.01,
            share_tolerance: 1e-3,
            disable_threshold: 1e-3,
            manual_configuration: Default::default(),
        }
    }
}

/// Heating pair indices of the technologies that repair operations treat specially.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TechnologyRoles {
    pub resource_constrained: usize,
    pub baseline: usize,
    pub reference: usize,
}

impl RepairConfig {
    pub fn from_json(json: impl Read) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_reader(json)?;
        config
            .validate()
            .map_err(|errors| anyhow!("Repair configuration failed validation: {errors}"))?;
        config.check_consistency()?;

        Ok(config)
    }

    pub fn layout(&self) -> Layout {
        Layout::new(
            self.heating_technologies.len(),
            self.heat_recovery_slots,
            self.solar_technologies.len(),
            self.trailing_slots,
        )
    }

    pub fn technology_index(&self, category: Category, name: &str) -> Result<usize, RepairError> {
        let names = match category {
            Category::Heating => &self.heating_technologies,
            Category::Solar => &self.solar_technologies,
        };
        names
            .iter()
            .position(|technology| technology == name)
            .ok_or_else(|| RepairError::UnknownTechnology(name.to_string()))
    }

    /// Name of the technology at `index`, or an empty string when the index is outside the
    /// configured list.
    pub fn technology_name(&self, category: Category, index: usize) -> &str {
        let names = match category {
            Category::Heating => &self.heating_technologies,
            Category::Solar => &self.solar_technologies,
        };
        names.get(index).map_or("", String::as_str)
    }

    pub fn roles(&self) -> Result<TechnologyRoles, RepairError> {
        Ok(TechnologyRoles {
            resource_constrained: self
                .technology_index(Category::Heating, &self.resource_constrained_technology)?,
            baseline: self.technology_index(Category::Heating, &self.baseline_technology)?,
            reference: self.technology_index(Category::Heating, &self.reference_technology)?,
        })
    }

    /// Cross-field checks that field-level validation cannot express.
    pub fn check_consistency(&self) -> Result<(), RepairError> {
        for (category, names) in [
            (Category::Heating, &self.heating_technologies),
            (Category::Solar, &self.solar_technologies),
        ] {
            if let Some(duplicate) = names.iter().duplicates().next() {
                return Err(RepairError::InvalidConfiguration(format!(
                    "{category} technology '{duplicate}' is listed more than once"
                )));
            }
        }

        let roles = self.roles()?;
        if roles.resource_constrained == roles.baseline {
            return Err(RepairError::InvalidConfiguration(
                "the baseline technology cannot be the resource-constrained technology"
                    .to_string(),
            ));
        }

        for name in self.manual_configuration.heating.keys() {
            self.technology_index(Category::Heating, name)?;
        }
        for name in self.manual_configuration.solar.keys() {
            self.technology_index(Category::Solar, name)?;
        }

        Ok(())
    }
}
