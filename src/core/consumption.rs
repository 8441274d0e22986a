use itertools::Itertools;

use crate::{
    core::{reading::EnergyReading, tariff::Tariff},
    quantity::{cost::Cost, energy::KilowattHours},
};

/// Net energy consumed over a period, and its price.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Consumption {
    pub energy: KilowattHours,
    pub cost: Cost,
}

impl Consumption {
    pub fn priced(energy: KilowattHours, tariff: &Tariff) -> Self {
        Self { energy, cost: tariff.cost(energy) }
    }
}

/// Sum the counter increments over an already ordered walk.
///
/// A drop of the counter is a meter reset: the new value is counted from a fresh zero baseline.
pub fn accumulate<'a>(readings: impl IntoIterator<Item = &'a EnergyReading>) -> KilowattHours {
    readings
        .into_iter()
        .tuple_windows()
        .map(|(previous, current)| {
            if current.energy >= previous.energy {
                current.energy - previous.energy
            } else {
                current.energy
            }
        })
        .sum()
}

/// Energy consumed over a day, tolerating any number of meter resets.
///
/// The readings may come in any order, they are stably sorted by their time first.
pub fn daily_consumption(readings: &[EnergyReading]) -> KilowattHours {
    accumulate(readings.iter().sorted_by(|lhs, rhs| lhs.time.cmp(&rhs.time)))
}

/// Energy consumed between two boundary readings of a cycle.
///
/// A negative difference clamps to zero, the intermediate samples are not inspected.
pub fn cycle_consumption(start_energy: KilowattHours, end_energy: KilowattHours) -> KilowattHours {
    (end_energy - start_energy).max(KilowattHours::ZERO)
}
