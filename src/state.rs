//! Last accepted reading and quality counters, shared with readers.
//!
//! Only the polling context writes. Readers take a [`Snapshot`], which may be
//! at most one cycle stale but is never torn: the reading fits in one atomic
//! word and is stored before `accepted` is bumped.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::frame::Reading;

/// Transaction and acceptance counters, never reset while running.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QualityCounters {
    /// Transactions started.
    pub attempts: u32,
    /// Readings that passed the checksum and plausibility checks.
    pub accepted: u32,
}

impl QualityCounters {
    /// Share of attempts that produced an accepted reading, in percent.
    pub fn quality_percent(&self) -> u32 {
        if self.attempts == 0 {
            return 0;
        }
        (self.accepted as u64 * 100 / self.attempts as u64) as u32
    }
}

/// Consistent copy of the shared state.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub reading: Reading,
    pub counters: QualityCounters,
}

/// Process-wide sensor state; put it in a `static` to share it with readers.
#[derive(Debug)]
pub struct SensorState {
    reading: AtomicU32,
    attempts: AtomicU32,
    accepted: AtomicU32,
}

impl Default for SensorState {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorState {
    pub const fn new() -> Self {
        SensorState {
            reading: AtomicU32::new(0),
            attempts: AtomicU32::new(0),
            accepted: AtomicU32::new(0),
        }
    }

    pub(crate) fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_accepted(&self, reading: Reading) {
        self.reading.store(pack(reading), Ordering::Relaxed);
        self.accepted.fetch_add(1, Ordering::Release);
    }

    pub fn counters(&self) -> QualityCounters {
        let accepted = self.accepted.load(Ordering::Acquire);
        QualityCounters {
            attempts: self.attempts.load(Ordering::Relaxed),
            accepted,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let counters = self.counters();
        Snapshot {
            reading: unpack(self.reading.load(Ordering::Relaxed)),
            counters,
        }
    }
}

fn pack(reading: Reading) -> u32 {
    (reading.temperature_tenths as u16 as u32) << 16 | reading.humidity_tenths as u16 as u32
}

fn unpack(word: u32) -> Reading {
    Reading {
        temperature_tenths: (word >> 16) as u16 as i16,
        humidity_tenths: word as u16 as i16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_has_no_data() {
        let state = SensorState::new();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.counters, QualityCounters::default());
        assert_eq!(snapshot.reading, Reading::default());
    }

    #[test]
    fn test_accepted_reading_is_visible() {
        let state = SensorState::new();
        state.record_attempt();
        state.record_accepted(Reading::new(-123, 456));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.reading, Reading::new(-123, 456));
        assert_eq!(
            snapshot.counters,
            QualityCounters {
                attempts: 1,
                accepted: 1
            }
        );
    }

    #[test]
    fn test_negative_values_survive_packing() {
        let reading = Reading::new(i16::MIN, -1);
        assert_eq!(unpack(pack(reading)), reading);
    }

    #[test]
    fn test_quality_percent() {
        assert_eq!(QualityCounters::default().quality_percent(), 0);
        let counters = QualityCounters {
            attempts: 3,
            accepted: 2,
        };
        assert_eq!(counters.quality_percent(), 66);
    }
}
