//! Formatting helpers for whatever surface publishes the readings.
//!
//! Values are printed as `<integer>.<tenths>`, and as `NaN` until at least
//! two readings have been accepted, so a single noisy first value is never
//! reported.

use core::fmt;

use crate::state::{QualityCounters, Snapshot};

/// Accepted readings required before values are reported.
pub const MIN_ACCEPTED: u32 = 2;

/// Fixed-point value in tenths, displayed as `<integer>.<tenths>`.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tenths(pub i16);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0 as i32;
        let sign = if value < 0 { "-" } else { "" };
        write!(f, "{}{}.{}", sign, value.abs() / 10, value.abs() % 10)
    }
}

/// A reported value, or `NaN` when there is no trustworthy data yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reported(pub Option<Tenths>);

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str("NaN"),
        }
    }
}

impl fmt::Display for QualityCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.attempts, self.accepted)
    }
}

impl Snapshot {
    /// Whether enough readings were accepted to report values.
    pub fn has_data(&self) -> bool {
        self.counters.accepted >= MIN_ACCEPTED
    }

    /// Temperature in tenths of a degree Celsius, once there is data.
    pub fn temperature(&self) -> Reported {
        Reported(
            self.has_data()
                .then_some(Tenths(self.reading.temperature_tenths)),
        )
    }

    /// Relative humidity in tenths of a percent, once there is data.
    pub fn humidity(&self) -> Reported {
        Reported(self.has_data().then_some(Tenths(self.reading.humidity_tenths)))
    }
}
