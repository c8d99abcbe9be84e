use crate::errors::RepairError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::io::Read;

/// Ground area available to boreholes, per building.
#[derive(Clone, Debug, Default)]
pub struct ResourceTable {
    areas: IndexMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct ResourceRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Area_geo")]
    area: f64,
}

#[derive(Debug, Deserialize)]
struct DemandRow {
    #[serde(rename = "Name")]
    name: String,
}

impl ResourceTable {
    /// Read the geothermal potential table. Columns other than `Name` and `Area_geo` are ignored.
    pub fn from_csv(csv: impl Read) -> anyhow::Result<Self> {
        let mut areas = IndexMap::new();
        for row in csv::Reader::from_reader(csv).deserialize::<ResourceRow>() {
            let ResourceRow { name, area } = row?;
            if !area.is_finite() || area < 0. {
                return Err(RepairError::InvalidResourceArea {
                    building: name,
                    area,
                }
                .into());
            }
            areas.insert(name, area);
        }

        Ok(Self { areas })
    }

    pub fn from_areas(areas: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            areas: areas.into_iter().collect(),
        }
    }

    pub fn area(&self, building: &str) -> Result<f64, RepairError> {
        self.areas
            .get(building)
            .copied()
            .ok_or_else(|| RepairError::MissingBuilding(building.to_string()))
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

/// Building names in the order used by the connectivity flags of every individual.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildingList(Vec<String>);

impl BuildingList {
    /// Read the building names from the `Name` column of the total demand table.
    pub fn from_total_demand_csv(csv: impl Read) -> anyhow::Result<Self> {
        Ok(Self(
            csv::Reader::from_reader(csv)
                .deserialize::<DemandRow>()
                .map(|row| row.map(|row| row.name))
                .collect::<Result<_, _>>()?,
        ))
    }

    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// The two read-only tables shared by every individual of a run.
#[derive(Clone, Debug, Default)]
pub struct ResourceTables {
    pub buildings: BuildingList,
    pub geothermal: ResourceTable,
}
