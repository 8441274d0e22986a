use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Billing cycle length in months, from one month to a whole year.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, derive_more::Display)]
#[serde(try_from = "u32", into = "u32")]
pub struct BillingPeriod(u32);

impl BillingPeriod {
    pub const MONTHLY: Self = Self(1);
    pub const YEARLY: Self = Self(12);

    #[must_use]
    pub const fn months(self) -> u32 {
        self.0
    }
}

impl Default for BillingPeriod {
    fn default() -> Self {
        Self::MONTHLY
    }
}

impl TryFrom<u32> for BillingPeriod {
    type Error = Error;

    fn try_from(months: u32) -> Result<Self> {
        ensure!(
            (Self::MONTHLY.0..=Self::YEARLY.0).contains(&months),
            "billing period must be between 1 and 12 months, got {months}",
        );
        Ok(Self(months))
    }
}

impl From<BillingPeriod> for u32 {
    fn from(period: BillingPeriod) -> Self {
        period.0
    }
}

impl FromStr for BillingPeriod {
    type Err = Error;

    fn from_str(months: &str) -> Result<Self> {
        months.parse::<u32>()?.try_into()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Previous,
    Next,
}

/// Calendar window of a billing cycle.
///
/// Each calendar year is partitioned into blocks of [`BillingPeriod`] consecutive months
/// starting at January.
#[must_use]
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct BillingCycle {
    /// Inclusive.
    pub start: NaiveDate,

    /// Inclusive.
    pub end: NaiveDate,

    pub length: BillingPeriod,
}

impl Debug for BillingCycle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..={:?}", self.start, self.end)
    }
}

impl Display for BillingCycle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} – {}", self.start.format("%d %b %Y"), self.end.format("%d %b %Y"))
    }
}

impl BillingCycle {
    /// Cycle that contains the reference date.
    ///
    /// The end saturates at the last representable date.
    pub fn containing(reference: NaiveDate, length: BillingPeriod) -> Self {
        let months = length.months();
        let month0 = reference.month0();
        let first_month0 = month0 / months * months;

        let first_of_month = reference - Days::new(u64::from(reference.day0()));
        let start = first_of_month - Months::new(month0 - first_month0);
        let end = start
            .checked_add_months(Months::new(months))
            .and_then(|next_start| next_start.pred_opt())
            .unwrap_or(NaiveDate::MAX);

        Self { start, end, length }
    }

    /// Adjacent cycle in the given direction, `None` past the calendar range.
    ///
    /// The neighbour is the cycle containing the day right after (or before) this one.
    /// Moving forth and back returns to the same cycle for every period length.
    #[must_use]
    pub fn shift(self, direction: Direction) -> Option<Self> {
        let reference = match direction {
            Direction::Previous => self.start.pred_opt()?,
            Direction::Next => self.end.succ_opt()?,
        };
        Some(Self::containing(reference, self.length))
    }

    /// Shift by `n` cycles, negative values move back in time.
    #[must_use]
    pub fn shift_by(self, n: i32) -> Option<Self> {
        let direction = if n < 0 { Direction::Previous } else { Direction::Next };
        (0..n.unsigned_abs()).try_fold(self, |cycle, _| cycle.shift(direction))
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start <= date) && (date <= self.end)
    }

    #[must_use]
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.contains(today)
    }

    /// Last day whose readings count towards the cycle: today for the running cycle.
    #[must_use]
    pub fn effective_end(&self, today: NaiveDate) -> NaiveDate {
        if self.is_current(today) { today } else { self.end }
    }

    /// Keep the selected date within the cycle.
    ///
    /// An out-of-cycle selection falls back to today if the cycle is the running one,
    /// and to the cycle start otherwise.
    #[must_use]
    pub fn clamp(&self, selected: NaiveDate, today: NaiveDate) -> NaiveDate {
        if self.contains(selected) {
            selected
        } else if self.contains(today) {
            today
        } else {
            self.start
        }
    }

    #[must_use]
    pub fn n_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take_while(|date| *date <= self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn period(months: u32) -> BillingPeriod {
        BillingPeriod::try_from(months).unwrap()
    }

    #[test]
    fn test_two_month_cycle() {
        let cycle = BillingCycle::containing(date(2024, 7, 15), period(2));
        assert_eq!(cycle.start, date(2024, 7, 1));
        assert_eq!(cycle.end, date(2024, 8, 31));
    }

    #[test]
    fn test_monthly_cycle_leap_february() {
        let cycle = BillingCycle::containing(date(2024, 2, 10), BillingPeriod::MONTHLY);
        assert_eq!(cycle.start, date(2024, 2, 1));
        assert_eq!(cycle.end, date(2024, 2, 29));
        assert_eq!(cycle.n_days(), 29);
    }

    #[test]
    fn test_cycle_boundaries_are_inclusive() {
        let cycle = BillingCycle::containing(date(2024, 8, 31), period(2));
        assert_eq!(cycle.start, date(2024, 7, 1));
        let cycle = BillingCycle::containing(date(2024, 9, 1), period(2));
        assert_eq!(cycle.start, date(2024, 9, 1));
        assert_eq!(cycle.end, date(2024, 10, 31));
    }

    #[test]
    fn test_non_dividing_length_spills_into_next_year() {
        let cycle = BillingCycle::containing(date(2024, 12, 5), period(5));
        assert_eq!(cycle.start, date(2024, 11, 1));
        assert_eq!(cycle.end, date(2025, 3, 31));
    }

    #[test]
    fn test_shift_across_year_boundary() {
        let cycle = BillingCycle::containing(date(2024, 12, 20), period(3));
        assert_eq!(cycle.start, date(2024, 10, 1));

        let next = cycle.shift(Direction::Next).unwrap();
        assert_eq!(next.start, date(2025, 1, 1));
        assert_eq!(next.end, date(2025, 3, 31));

        let previous = next.shift_by(-2).unwrap();
        assert_eq!(previous.start, date(2024, 7, 1));
        assert_eq!(previous.end, date(2024, 9, 30));
    }

    #[test]
    fn test_shift_spilling_cycle() {
        let cycle = BillingCycle::containing(date(2024, 12, 5), period(5));

        let next = cycle.shift(Direction::Next).unwrap();
        assert_eq!(next.start, date(2025, 1, 1));
        assert_eq!(next.end, date(2025, 5, 31));
        assert_eq!(next.shift(Direction::Previous), Some(cycle));

        let previous = cycle.shift(Direction::Previous).unwrap();
        assert_eq!(previous.start, date(2024, 6, 1));
        assert_eq!(previous.end, date(2024, 10, 31));
        assert_eq!(previous.shift(Direction::Next), Some(cycle));
    }

    #[test]
    fn test_shift_round_trip() {
        for months in 1..=12 {
            for reference in date(2020, 1, 1).iter_days().step_by(7).take(420) {
                let cycle = BillingCycle::containing(reference, period(months));
                assert_eq!(
                    cycle.shift(Direction::Next).and_then(|next| next.shift(Direction::Previous)),
                    Some(cycle),
                    "{months} months, {reference}",
                );
                assert_eq!(
                    cycle.shift(Direction::Previous).and_then(|previous| previous.shift(Direction::Next)),
                    Some(cycle),
                    "{months} months, {reference}",
                );
            }
        }
    }

    #[test]
    fn test_shift_by() {
        let cycle = BillingCycle::containing(date(2024, 7, 15), period(2));
        assert_eq!(cycle.shift_by(0), Some(cycle));
        assert_eq!(cycle.shift_by(-4).unwrap().start, date(2023, 11, 1));
        assert_eq!(cycle.shift_by(3).unwrap().start, date(2025, 1, 1));
    }

    #[test]
    fn test_shift_past_calendar_range() {
        let last = BillingCycle::containing(NaiveDate::MAX, BillingPeriod::MONTHLY);
        assert_eq!(last.end, NaiveDate::MAX);
        assert_eq!(last.shift(Direction::Next), None);

        let cycle = BillingCycle::containing(date(2024, 7, 15), BillingPeriod::YEARLY);
        assert_eq!(cycle.shift_by(i32::MAX), None);
        assert_eq!(cycle.shift_by(i32::MIN), None);
    }

    #[test]
    fn test_clamp() {
        let cycle = BillingCycle::containing(date(2024, 7, 15), period(2));
        let today = date(2024, 8, 10);

        assert_eq!(cycle.clamp(date(2024, 7, 3), today), date(2024, 7, 3));
        assert_eq!(cycle.clamp(date(2024, 6, 30), today), today);
        assert_eq!(cycle.clamp(date(2024, 6, 30), date(2025, 1, 1)), cycle.start);
    }

    #[test]
    fn test_effective_end() {
        let cycle = BillingCycle::containing(date(2024, 7, 15), period(2));
        assert_eq!(cycle.effective_end(date(2024, 7, 20)), date(2024, 7, 20));
        assert_eq!(cycle.effective_end(date(2024, 9, 2)), cycle.end);
    }

    #[test]
    fn test_days() {
        let cycle = BillingCycle::containing(date(2024, 2, 10), BillingPeriod::MONTHLY);
        let days: Vec<_> = cycle.days().collect();
        assert_eq!(days.len(), 29);
        assert_eq!(days.last(), Some(&date(2024, 2, 29)));
    }

    #[test]
    fn test_parse_billing_period() {
        assert_eq!("3".parse::<BillingPeriod>().unwrap(), period(3));
        assert_eq!("12".parse::<BillingPeriod>().unwrap(), BillingPeriod::YEARLY);
        assert!("0".parse::<BillingPeriod>().is_err());
        assert!("13".parse::<BillingPeriod>().is_err());
        assert!(BillingPeriod::try_from(u32::MAX).is_err());
    }

    #[test]
    fn test_yearly_cycle() {
        let cycle = BillingCycle::containing(date(2024, 7, 15), BillingPeriod::YEARLY);
        assert_eq!(cycle.start, date(2024, 1, 1));
        assert_eq!(cycle.end, date(2024, 12, 31));
        assert_eq!(cycle.n_days(), 366);
    }
}
