use std::{collections::BTreeMap, path::Path};

use chrono::NaiveDate;
use itertools::Itertools;
use serde::Deserialize;
use serde_with::{MapSkipError, VecSkipError, serde_as};

use crate::{
    core::{
        consumption::{accumulate, cycle_consumption},
        cycle::BillingCycle,
        reading::EnergyReading,
    },
    prelude::*,
    quantity::energy::KilowattHours,
    records::reading::RawReading,
};

/// One day of readings: either a plain list or a collection keyed by document ID.
#[serde_as]
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDay {
    List(#[serde_as(as = "VecSkipError<_>")] Vec<RawReading>),
    Keyed(#[serde_as(as = "MapSkipError<_, _>")] BTreeMap<String, RawReading>),
}

impl RawDay {
    fn into_readings(self) -> Vec<EnergyReading> {
        match self {
            Self::List(readings) => readings.into_iter().filter_map(RawReading::into_reading).collect(),
            Self::Keyed(readings) => {
                readings.into_values().filter_map(RawReading::into_reading).collect()
            }
        }
    }
}

#[serde_as]
#[derive(Deserialize)]
#[serde(transparent)]
struct RawHistory(#[serde_as(as = "MapSkipError<_, _>")] BTreeMap<NaiveDate, RawDay>);

/// Cumulative energy at both ends of a billing cycle.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CycleBoundaries {
    pub start: KilowattHours,
    pub end: KilowattHours,
}

impl CycleBoundaries {
    pub fn consumption(self) -> KilowattHours {
        cycle_consumption(self.start, self.end)
    }
}

/// Readings grouped by calendar day, each day in arrival order.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct History(BTreeMap<NaiveDate, Vec<EnergyReading>>);

impl FromIterator<(NaiveDate, EnergyReading)> for History {
    fn from_iter<T: IntoIterator<Item = (NaiveDate, EnergyReading)>>(iterator: T) -> Self {
        let mut days = BTreeMap::<_, Vec<_>>::new();
        for (date, reading) in iterator {
            days.entry(date).or_default().push(reading);
        }
        Self(days)
    }
}

impl History {
    pub fn from_json(json: &str) -> Result<Self> {
        let RawHistory(days) = serde_json::from_str(json)?;
        Ok(Self(
            days.into_iter().map(|(date, day)| (date, day.into_readings())).collect(),
        ))
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let this = Self::from_json(&json)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;
        info!(n_days = this.0.len(), n_readings = this.n_readings(), "loaded the history");
        Ok(this)
    }

    #[must_use]
    pub fn n_readings(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn day(&self, date: NaiveDate) -> &[EnergyReading] {
        self.0.get(&date).map_or(&[], Vec::as_slice)
    }

    /// Counter value at the start of the day.
    ///
    /// Falls back to the last reading of the previous day when the day has no readings.
    #[must_use]
    pub fn opening_energy(&self, date: NaiveDate) -> Option<KilowattHours> {
        earliest(self.day(date))
            .or_else(|| date.pred_opt().and_then(|previous| latest(self.day(previous))))
            .map(|reading| reading.energy)
    }

    /// Latest counter value within the inclusive date range.
    #[must_use]
    pub fn closing_energy(&self, since: NaiveDate, until: NaiveDate) -> Option<KilowattHours> {
        if since > until {
            return None;
        }
        self.0
            .range(since..=until)
            .rev()
            .find_map(|(_, readings)| latest(readings))
            .map(|reading| reading.energy)
    }

    /// Boundary counter values of the cycle, missing values default to zero.
    pub fn cycle_boundaries(&self, cycle: &BillingCycle, today: NaiveDate) -> CycleBoundaries {
        let start = self.opening_energy(cycle.start).unwrap_or_else(|| {
            warn!(date = %cycle.start, "no reading to open the cycle with");
            KilowattHours::ZERO
        });
        let end = self.closing_energy(cycle.start, cycle.effective_end(today)).unwrap_or_else(|| {
            warn!(?cycle, "no reading to close the cycle with");
            KilowattHours::ZERO
        });
        debug!(?start, ?end, "cycle boundaries");
        CycleBoundaries { start, end }
    }

    /// Reset-tolerant consumption over every sample within the inclusive date range.
    ///
    /// The last reading of the previous day serves as the baseline, when present.
    #[must_use]
    pub fn walk(&self, since: NaiveDate, until: NaiveDate) -> KilowattHours {
        if since > until {
            return KilowattHours::ZERO;
        }
        let baseline = since.pred_opt().and_then(|previous| latest(self.day(previous)));
        let samples = self
            .0
            .range(since..=until)
            .flat_map(|(_, readings)| readings.iter().sorted_by(|lhs, rhs| lhs.time.cmp(&rhs.time)));
        accumulate(baseline.into_iter().chain(samples))
    }
}

fn earliest(readings: &[EnergyReading]) -> Option<&EnergyReading> {
    readings.iter().min_by(|lhs, rhs| lhs.time.cmp(&rhs.time))
}

fn latest(readings: &[EnergyReading]) -> Option<&EnergyReading> {
    readings.iter().max_by(|lhs, rhs| lhs.time.cmp(&rhs.time))
}
