//! Periodic polling of the sensor.
//!
//! Readings are taken every `base_interval_s` ticks. A rejected frame or the
//! very first accepted reading is re-checked after `short_delay_ticks`
//! instead, so transient corruption is recovered from quickly.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::am2301::Am2301;
use crate::config::PollConfig;
use crate::error::DhtError;
use crate::filter::{Filter, Verdict};

/// Request to end [`Poller::run`], settable from any context.
#[derive(Debug, Default)]
pub struct StopSignal(AtomicBool);

impl StopSignal {
    pub const fn new() -> Self {
        StopSignal(AtomicBool::new(false))
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Drives transactions at the configured cadence.
pub struct Poller<'a, PIN, D> {
    sensor: Am2301<'a, PIN, D>,
    filter: Filter,
    config: PollConfig,
    remaining_delay_ticks: u32,
}

impl<'a, PIN, DELAY, E> Poller<'a, PIN, DELAY>
where
    PIN: OutputPin<Error = E>,
    DELAY: DelayNs,
{
    /// Creates a poller; the first tick reads the sensor immediately.
    pub fn new(mut sensor: Am2301<'a, PIN, DELAY>, config: PollConfig) -> Self {
        sensor.set_response_timeout_us(config.response_timeout_us);
        Poller {
            sensor,
            filter: Filter::new(),
            config,
            remaining_delay_ticks: 0,
        }
    }

    /// Ticks left before the next transaction.
    pub fn remaining_delay_ticks(&self) -> u32 {
        self.remaining_delay_ticks
    }

    /// Runs a single scheduler tick without sleeping.
    ///
    /// Returns `None` while waiting, otherwise the outcome of the
    /// transaction performed on this tick.
    pub fn tick(&mut self) -> Option<Result<Verdict, DhtError<E>>> {
        if self.remaining_delay_ticks > 0 {
            self.remaining_delay_ticks -= 1;
            return None;
        }

        let state = self.sensor.state();
        let result = self
            .sensor
            .read_frame()
            .and_then(|frame| self.filter.apply(&frame, state));

        self.remaining_delay_ticks = match &result {
            Ok(Verdict::Probation) => {
                info!("first reading accepted on probation");
                self.config.short_delay_ticks
            }
            Ok(Verdict::Stable) => {
                let counters = state.counters();
                debug!(
                    "reading accepted ({}/{})",
                    counters.attempts,
                    counters.accepted
                );
                self.config.base_interval_s
            }
            Err(e) if e.is_rejection() => {
                warn!("frame rejected: {}", e.kind());
                self.config.short_delay_ticks
            }
            Err(e) => {
                warn!("transaction failed: {}", e.kind());
                self.config.base_interval_s
            }
        };

        Some(result)
    }

    /// Polls until `stop` is signalled, then releases the line.
    ///
    /// The stop request is checked once per tick, so shutdown takes at most
    /// one tick plus one in-flight transaction.
    pub fn run(mut self, stop: &StopSignal) -> (PIN, DELAY) {
        while !stop.is_stopped() {
            self.tick();
            self.sensor.pause_ms(self.config.tick_ms);
        }

        info!("polling stopped");
        self.sensor.release()
    }
}
