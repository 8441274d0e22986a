use itertools::{Itertools, MinMaxResult};

use crate::{
    core::{
        consumption::daily_consumption,
        reading::{EnergyReading, ReadingTime},
    },
    quantity::{electric::Watts, energy::KilowattHours},
};

/// Per-day statistics over the raw samples.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct DailySummary {
    pub n_samples: usize,
    pub consumption: KilowattHours,
    pub average_power: Watts,
    pub peak_power: Watts,
    pub first_at: Option<ReadingTime>,
    pub last_at: Option<ReadingTime>,
}

impl DailySummary {
    pub fn from_readings(readings: &[EnergyReading]) -> Self {
        let n_samples = readings.len();
        #[expect(clippy::cast_precision_loss)]
        let average_power = if n_samples == 0 {
            Watts::ZERO
        } else {
            readings.iter().map(|reading| reading.power).sum::<Watts>() / n_samples as f64
        };
        let peak_power = readings.iter().map(|reading| reading.power).max().unwrap_or(Watts::ZERO);
        let (first_at, last_at) = match readings.iter().map(|reading| &reading.time).minmax() {
            MinMaxResult::NoElements => (None, None),
            MinMaxResult::OneElement(time) => (Some(time.clone()), Some(time.clone())),
            MinMaxResult::MinMax(first, last) => (Some(first.clone()), Some(last.clone())),
        };
        Self {
            n_samples,
            consumption: daily_consumption(readings),
            average_power,
            peak_power,
            first_at,
            last_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_empty() {
        let summary = DailySummary::from_readings(&[]);
        assert_eq!(summary.n_samples, 0);
        assert_eq!(summary.average_power, Watts::ZERO);
        assert_eq!(summary.first_at, None);
    }

    #[test]
    fn test_summary() {
        let readings = [
            EnergyReading::builder().time("12:00:00").energy(1.2).power(100.0).build(),
            EnergyReading::builder().time("08:00:00").energy(1.0).power(300.0).build(),
            EnergyReading::builder().time("18:00:00").energy(0.1).power(200.0).build(),
        ];
        let summary = DailySummary::from_readings(&readings);
        assert_eq!(summary.n_samples, 3);
        assert_abs_diff_eq!(summary.consumption.0, 0.3, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.average_power.0, 200.0);
        assert_eq!(summary.peak_power, Watts(300.0));
        assert_eq!(summary.first_at, Some(ReadingTime::from("08:00:00")));
        assert_eq!(summary.last_at, Some(ReadingTime::from("18:00:00")));
    }
}
