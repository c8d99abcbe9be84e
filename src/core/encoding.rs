use crate::errors::RepairError;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use strum::Display as StrumDisplay;

/// The fixed part of an individual's encoding, derived from the technology configuration.
///
/// Slots are laid out as heating pairs, heat-recovery slots, solar pairs, trailing scalar
/// slots and finally one connectivity flag per building.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    heating: usize,
    recovery: usize,
    solar: usize,
    trailing: usize,
}

impl Layout {
    /// Arguments:
    /// * `heating` - number of heating technologies (each encoded as an active/share pair)
    /// * `recovery` - number of heat-recovery slots, passed through untouched
    /// * `solar` - number of solar technologies (each encoded as an active/share pair)
    /// * `trailing` - number of scalar slots between the solar pairs and the building flags
    pub fn new(heating: usize, recovery: usize, solar: usize, trailing: usize) -> Self {
        Self {
            heating,
            recovery,
            solar,
            trailing,
        }
    }

    pub fn heating_count(&self) -> usize {
        self.heating
    }

    pub fn solar_count(&self) -> usize {
        self.solar
    }

    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Heating => self.heating,
            Category::Solar => self.solar,
        }
    }

    pub(crate) fn recovery_start(&self) -> usize {
        2 * self.heating
    }

    pub(crate) fn solar_start(&self) -> usize {
        self.recovery_start() + self.recovery
    }

    /// Length of the segment replaced wholesale when an individual cannot be repaired locally.
    pub fn structural_len(&self) -> usize {
        self.solar_start() + 2 * self.solar
    }

    pub fn building_start(&self) -> usize {
        self.structural_len() + self.trailing
    }

    pub fn len_for(&self, building_count: usize) -> usize {
        self.building_start() + building_count
    }

    /// Whether both layouts place the same pairs and heat-recovery slots in the structural
    /// segment. Trailing slots are not compared.
    pub fn same_structure(&self, other: &Layout) -> bool {
        self.heating == other.heating
            && self.recovery == other.recovery
            && self.solar == other.solar
    }

    fn pair_start(&self, category: Category, index: usize) -> usize {
        match category {
            Category::Heating => 2 * index,
            Category::Solar => self.solar_start() + 2 * index,
        }
    }
}

/// Technology groups whose shares must each sum to one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Heating,
    Solar,
}

/// The (active, share) pair encoding one technology.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TechnologyPair {
    pub active: f64,
    pub share: f64,
}

impl TechnologyPair {
    pub fn is_active(&self) -> bool {
        self.active > 0.
    }
}

/// One candidate configuration of the district's energy supply.
#[derive(Clone, Debug, PartialEq)]
pub struct Individual {
    layout: Layout,
    slots: Vec<f64>,
}

impl Individual {
    pub fn new(layout: Layout, slots: Vec<f64>) -> Result<Self, RepairError> {
        if slots.len() < layout.building_start() {
            return Err(RepairError::IndividualTooShort {
                expected: layout.building_start(),
                found: slots.len(),
            });
        }

        Ok(Self { layout, slots })
    }

    /// An individual with every slot zeroed and room for `building_count` connectivity flags.
    pub fn zeroed(layout: Layout, building_count: usize) -> Self {
        Self {
            layout,
            slots: vec![0.; layout.len_for(building_count)],
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Fail unless the individual was built with `expected`, so technology indices taken from
    /// a configuration address the right slots.
    pub fn ensure_layout(&self, expected: &Layout) -> Result<(), RepairError> {
        if self.layout != *expected {
            return Err(RepairError::LayoutMismatch {
                expected: *expected,
                found: self.layout,
            });
        }

        Ok(())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.slots
    }

    pub fn into_slots(self) -> Vec<f64> {
        self.slots
    }

    pub fn pair(&self, category: Category, index: usize) -> TechnologyPair {
        let start = self.layout.pair_start(category, index);
        TechnologyPair {
            active: self.slots[start],
            share: self.slots[start + 1],
        }
    }

    pub fn pairs(&self, category: Category) -> impl Iterator<Item = TechnologyPair> + '_ {
        (0..self.layout.count(category)).map(move |index| self.pair(category, index))
    }

    pub fn heating(&self, index: usize) -> TechnologyPair {
        self.pair(Category::Heating, index)
    }

    pub fn solar(&self, index: usize) -> TechnologyPair {
        self.pair(Category::Solar, index)
    }

    pub fn set_pair(&mut self, category: Category, index: usize, pair: TechnologyPair) {
        let start = self.layout.pair_start(category, index);
        self.slots[start] = pair.active;
        self.slots[start + 1] = pair.share;
    }

    pub fn set_share(&mut self, category: Category, index: usize, share: f64) {
        let start = self.layout.pair_start(category, index);
        self.slots[start + 1] = share;
    }

    /// Sum of the shares of every active technology in the category.
    pub fn active_share_sum(&self, category: Category) -> f64 {
        self.pairs(category)
            .filter(TechnologyPair::is_active)
            .map(|pair| pair.share)
            .sum()
    }

    pub fn any_active(&self, category: Category) -> bool {
        self.pairs(category).any(|pair| pair.is_active())
    }

    pub fn structural_segment(&self) -> &[f64] {
        &self.slots[..self.layout.structural_len()]
    }

    /// Overwrite the heating, heat-recovery and solar slots with those of `replacement`,
    /// leaving trailing slots and building flags as they were.
    pub fn splice_structural_segment(
        &mut self,
        replacement: &Individual,
    ) -> Result<(), RepairError> {
        if !self.layout.same_structure(&replacement.layout) {
            return Err(RepairError::GeneratedLayoutMismatch {
                expected: self.layout,
                found: replacement.layout,
            });
        }
        let len = self.layout.structural_len();
        self.slots[..len].copy_from_slice(replacement.structural_segment());

        Ok(())
    }

    pub(crate) fn clear_fixed_slots(&mut self) {
        let end = self.layout.building_start();
        self.slots[..end].fill(0.);
    }

    pub fn building_count(&self) -> usize {
        self.slots.len() - self.layout.building_start()
    }

    pub fn building_flags(&self) -> &[f64] {
        &self.slots[self.layout.building_start()..]
    }

    pub(crate) fn connect_all_buildings(&mut self) {
        let start = self.layout.building_start();
        self.slots[start..].fill(1.);
    }

    pub fn barcode(&self) -> Result<Barcode, RepairError> {
        Barcode::from_flags(self.building_flags(), self.layout.building_start())
    }
}

/// Which buildings are connected to the district network, in building list order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Barcode(Vec<bool>);

impl Barcode {
    fn from_flags(flags: &[f64], offset: usize) -> Result<Self, RepairError> {
        flags
            .iter()
            .enumerate()
            .map(|(i, &value)| match value {
                v if v == 1. => Ok(true),
                v if v == 0. => Ok(false),
                _ => Err(RepairError::InvalidConnectivityFlag {
                    index: offset + i,
                    value,
                }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }
}

impl Display for Barcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .iter()
                .map(|&connected| if connected { '1' } else { '0' })
                .join("")
        )
    }
}
