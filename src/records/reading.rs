use serde::Deserialize;
use serde_with::{DefaultOnError, DisplayFromStr, PickFirst, serde_as};

use crate::{
    core::reading::{EnergyReading, ReadingTime},
    quantity::{
        electric::{Amperes, Volts, Watts},
        energy::KilowattHours,
    },
};

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawTime {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<RawTime> for ReadingTime {
    fn from(time: RawTime) -> Self {
        match time {
            RawTime::Text(time) => Self::Clock(time),
            RawTime::Integer(millis) => Self::Epoch(millis),
            #[expect(clippy::cast_possible_truncation)]
            RawTime::Float(millis) => Self::Epoch(millis as i64),
        }
    }
}

/// Reading as stored by the device firmware.
///
/// Numbers may also arrive as strings. Anything unparsable becomes zero.
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawReading {
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub time: Option<RawTime>,

    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    pub energy: f64,

    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    pub voltage: f64,

    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    pub current: f64,

    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    pub power: f64,
}

const fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

impl RawReading {
    /// Convert into a reading, `None` when the record carries no timestamp.
    pub fn into_reading(mut self) -> Option<EnergyReading> {
        let time = self.time.take()?;
        Some(self.stamped(time.into()))
    }

    /// Convert into a reading with an externally assigned timestamp.
    pub fn stamped(self, time: ReadingTime) -> EnergyReading {
        EnergyReading::builder()
            .time(time)
            .energy(KilowattHours(finite_or_zero(self.energy)))
            .voltage(Volts(finite_or_zero(self.voltage)))
            .current(Amperes(finite_or_zero(self.current)))
            .power(Watts(finite_or_zero(self.power)))
            .build()
    }
}
