use std::{
    borrow::Cow,
    cmp::Ordering,
    fmt::{Display, Formatter},
};

use crate::quantity::{
    electric::{Amperes, Volts, Watts},
    energy::KilowattHours,
};

/// Sortable reading timestamp as written by the device.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReadingTime {
    /// Wall-clock time of day, for example `14:05:09`.
    Clock(String),

    /// Milliseconds since the Unix epoch.
    Epoch(i64),
}

impl ReadingTime {
    fn as_token(&self) -> Cow<'_, str> {
        match self {
            Self::Clock(time) => Cow::Borrowed(time),
            Self::Epoch(millis) => Cow::Owned(millis.to_string()),
        }
    }
}

impl Display for ReadingTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_token())
    }
}

impl PartialOrd for ReadingTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReadingTime {
    /// Epochs compare numerically, anything else compares by the textual token.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Epoch(lhs), Self::Epoch(rhs)) => lhs.cmp(rhs),
            _ => self.as_token().cmp(&other.as_token()),
        }
    }
}

impl From<&str> for ReadingTime {
    fn from(time: &str) -> Self {
        Self::Clock(time.to_owned())
    }
}

impl From<i64> for ReadingTime {
    fn from(millis: i64) -> Self {
        Self::Epoch(millis)
    }
}

/// Single meter sample.
///
/// `energy` is the cumulative counter, which drops back towards zero whenever the meter restarts.
#[must_use]
#[derive(Clone, Debug, PartialEq, bon::Builder)]
pub struct EnergyReading {
    #[builder(into)]
    pub time: ReadingTime,

    #[builder(into)]
    pub energy: KilowattHours,

    #[builder(default, into)]
    pub voltage: Volts,

    #[builder(default, into)]
    pub current: Amperes,

    #[builder(default, into)]
    pub power: Watts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_ordering() {
        assert!(ReadingTime::from("09:59:59") < ReadingTime::from("10:00:00"));
    }

    #[test]
    fn test_epoch_ordering_is_numeric() {
        assert!(ReadingTime::from(999) < ReadingTime::from(1000));
    }

    #[test]
    fn test_mixed_ordering_is_textual() {
        assert!(ReadingTime::from(1000) < ReadingTime::from("2"));
    }

    #[test]
    fn test_builder_defaults() {
        let reading = EnergyReading::builder().time("00:00:01").energy(1.5).build();
        assert_eq!(reading.power, Watts::ZERO);
        assert_eq!(reading.energy, KilowattHours(1.5));
    }
}
