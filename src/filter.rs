//! Frame validation and the plausibility filter.
//!
//! The checksum is a plain additive sum, so a dropped or flipped bit can still
//! yield a self-consistent frame. Such frames usually show up as a sudden jump,
//! which is what the plausibility check looks for.

use crate::error::DhtError;
use crate::frame::{RawFrame, Reading};
use crate::state::SensorState;

/// Largest accepted temperature change between consecutive decodes (5.0 C).
pub const MAX_TEMPERATURE_STEP_TENTHS: i32 = 50;

/// Largest accepted humidity change between consecutive decodes (10.0 %RH).
pub const MAX_HUMIDITY_STEP_TENTHS: i32 = 100;

/// Checks and decodes `frame`, comparing it against the previous raw decode.
///
/// # Returns
///
/// * `Ok(Reading)` if the checksum is valid and the reading is plausible.
/// * `Err(DhtError::ChecksumMismatch)` if the checksum does not match.
/// * `Err(DhtError::Implausible { .. })` if the reading jumped too far.
pub fn validate<E>(frame: &RawFrame, previous_raw: Option<Reading>) -> Result<Reading, DhtError<E>> {
    if !frame.checksum_ok() {
        return Err(DhtError::ChecksumMismatch);
    }

    let current = frame.decode();
    match previous_raw {
        Some(previous) if !is_plausible(&previous, &current) => {
            Err(DhtError::Implausible { previous, current })
        }
        _ => Ok(current),
    }
}

fn is_plausible(previous: &Reading, current: &Reading) -> bool {
    let temperature_step = current.temperature_tenths as i32 - previous.temperature_tenths as i32;
    let humidity_step = current.humidity_tenths as i32 - previous.humidity_tenths as i32;

    temperature_step.abs() <= MAX_TEMPERATURE_STEP_TENTHS
        && humidity_step.abs() <= MAX_HUMIDITY_STEP_TENTHS
}

/// How an accepted reading should be trusted.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// First reading ever, accepted without history; re-check soon.
    Probation,
    /// Reading agrees with the previous decode.
    Stable,
}

/// Stateful stage turning frames into accepted readings.
#[derive(Debug, Default)]
pub struct Filter {
    previous_raw: Option<Reading>,
}

impl Filter {
    pub const fn new() -> Self {
        Filter { previous_raw: None }
    }

    /// Last checksum-valid decode, accepted or not.
    pub fn previous_raw(&self) -> Option<Reading> {
        self.previous_raw
    }

    /// Validates `frame` and records the outcome in `state`.
    ///
    /// Every checksum-valid decode becomes the new comparison baseline, so a
    /// genuine step change is accepted on the following reading.
    pub fn apply<E>(&mut self, frame: &RawFrame, state: &SensorState) -> Result<Verdict, DhtError<E>> {
        match validate(frame, self.previous_raw) {
            Ok(reading) => {
                let verdict = if self.previous_raw.is_none() {
                    Verdict::Probation
                } else {
                    Verdict::Stable
                };
                self.previous_raw = Some(reading);
                state.record_accepted(reading);
                Ok(verdict)
            }
            Err(DhtError::Implausible { previous, current }) => {
                self.previous_raw = Some(current);
                Err(DhtError::Implausible { previous, current })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    fn frame(temperature_tenths: i16, humidity_tenths: i16) -> RawFrame {
        RawFrame::from_reading(Reading::new(temperature_tenths, humidity_tenths))
    }

    #[test]
    fn test_rejects_bad_checksum() {
        let frame = RawFrame([0x01, 0x90, 0x00, 0xF6, 0x81]);
        assert_eq!(
            validate::<Infallible>(&frame, None),
            Err(DhtError::ChecksumMismatch)
        );
    }

    #[test]
    fn test_first_frame_needs_no_history() {
        assert_eq!(
            validate::<Infallible>(&frame(-400, 0), None),
            Ok(Reading::new(-400, 0))
        );
    }

    #[test]
    fn test_temperature_step_limit() {
        let previous = Some(Reading::new(200, 500));

        assert_eq!(
            validate::<Infallible>(&frame(260, 500), previous),
            Err(DhtError::Implausible {
                previous: Reading::new(200, 500),
                current: Reading::new(260, 500),
            })
        );
        assert_eq!(
            validate::<Infallible>(&frame(240, 500), previous),
            Ok(Reading::new(240, 500))
        );
        assert_eq!(
            validate::<Infallible>(&frame(150, 500), previous),
            Ok(Reading::new(150, 500))
        );
        assert!(validate::<Infallible>(&frame(149, 500), previous).is_err());
    }

    #[test]
    fn test_humidity_step_limit() {
        let previous = Some(Reading::new(200, 500));

        assert!(validate::<Infallible>(&frame(200, 600), previous).is_ok());
        assert!(validate::<Infallible>(&frame(200, 601), previous).is_err());
        assert!(validate::<Infallible>(&frame(200, 399), previous).is_err());
    }

    #[test]
    fn test_filter_probation_then_stable() {
        let state = SensorState::new();
        let mut filter = Filter::new();

        assert_eq!(
            filter.apply::<Infallible>(&frame(200, 500), &state),
            Ok(Verdict::Probation)
        );
        assert_eq!(
            filter.apply::<Infallible>(&frame(210, 505), &state),
            Ok(Verdict::Stable)
        );

        let snapshot = state.snapshot();
        assert_eq!(snapshot.counters.accepted, 2);
        assert_eq!(snapshot.reading, Reading::new(210, 505));
    }

    #[test]
    fn test_second_frame_is_filtered_against_first() {
        let state = SensorState::new();
        let mut filter = Filter::new();

        filter.apply::<Infallible>(&frame(200, 500), &state).unwrap();
        let err = filter.apply::<Infallible>(&frame(900, 500), &state).unwrap_err();

        assert!(matches!(err, DhtError::Implausible { .. }));
        assert_eq!(state.snapshot().counters.accepted, 1);
        assert_eq!(state.snapshot().reading, Reading::new(200, 500));
    }

    #[test]
    fn test_rejected_decode_still_moves_baseline() {
        let state = SensorState::new();
        let mut filter = Filter::new();

        filter.apply::<Infallible>(&frame(200, 500), &state).unwrap();
        assert!(filter.apply::<Infallible>(&frame(300, 500), &state).is_err());
        assert_eq!(filter.previous_raw(), Some(Reading::new(300, 500)));

        // The step change is genuine: the next similar reading is accepted.
        assert_eq!(
            filter.apply::<Infallible>(&frame(302, 500), &state),
            Ok(Verdict::Stable)
        );
        assert_eq!(state.snapshot().reading, Reading::new(302, 500));
    }

    #[test]
    fn test_checksum_failure_keeps_baseline() {
        let state = SensorState::new();
        let mut filter = Filter::new();
        filter.apply::<Infallible>(&frame(200, 500), &state).unwrap();

        let corrupt = RawFrame([0x01, 0x90, 0x00, 0xF6, 0x00]);
        assert_eq!(
            filter.apply::<Infallible>(&corrupt, &state),
            Err(DhtError::ChecksumMismatch)
        );
        assert_eq!(filter.previous_raw(), Some(Reading::new(200, 500)));
        assert_eq!(state.snapshot().counters.accepted, 1);
    }
}
