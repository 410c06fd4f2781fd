use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::config::DEFAULT_RESPONSE_TIMEOUT_US;
use crate::error::DhtError;
use crate::frame::RawFrame;
use crate::link::FrameLink;
use crate::state::SensorState;

/// How long the line is held high before the start request (in milliseconds).
const IDLE_HIGH_MS: u32 = 2;

/// Length of the host start request low pulse (in microseconds).
///
/// The sensor needs at least 750us.
const START_LOW_US: u32 = 800;

/// Granularity of the wait for frame completion (in microseconds).
const POLL_STEP_US: u32 = 100;

/// Transaction orchestrator for the AM2301 (DHT21) sensor.
///
/// Bits are decoded from edge notifications by an [`EdgeHandler`] bound to
/// the same [`FrameLink`]; this side only drives the start request and waits
/// for the finished frame.
///
/// [`EdgeHandler`]: crate::decoder::EdgeHandler
pub struct Am2301<'a, PIN, D> {
    pin: PIN,
    delay: D,
    link: &'a FrameLink,
    state: &'a SensorState,
    response_timeout_us: u32,
}

impl<'a, PIN, DELAY, E> Am2301<'a, PIN, DELAY>
where
    PIN: OutputPin<Error = E>,
    DELAY: DelayNs,
{
    /// Creates a new instance of the AM2301 driver.
    ///
    /// # Arguments
    ///
    /// * `pin` - The GPIO pin connected to the data line, configured open-drain
    ///   with a pull-up so that driving it high releases the line to the sensor.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    /// * `link` - Completion link shared with the edge notification handler.
    /// * `state` - Shared state receiving the attempt counter.
    pub fn new(pin: PIN, delay: DELAY, link: &'a FrameLink, state: &'a SensorState) -> Self {
        Am2301 {
            pin,
            delay,
            link,
            state,
            response_timeout_us: DEFAULT_RESPONSE_TIMEOUT_US,
        }
    }

    /// Sets how long [`read_frame`](Self::read_frame) waits for the sensor.
    ///
    /// The wait advances in 100us steps, rounded up.
    pub fn set_response_timeout_us(&mut self, timeout_us: u32) {
        self.response_timeout_us = timeout_us;
    }

    pub fn state(&self) -> &'a SensorState {
        self.state
    }

    /// Performs one complete transaction with the sensor.
    ///
    /// Sends the start request, arms the decoder and waits, bounded by the
    /// response timeout, for the frame to complete. Every call counts as one
    /// attempt whatever the outcome.
    ///
    /// # Returns
    ///
    /// * `Ok(RawFrame)` with the unvalidated frame.
    /// * `Err(DhtError::Timeout)` if no complete frame arrived in time.
    /// * `Err(DhtError::PinError)` if driving the line failed.
    pub fn read_frame(&mut self) -> Result<RawFrame, DhtError<E>> {
        self.state.record_attempt();

        let generation = self.start()?;
        self.wait_for_frame(generation)
    }

    /// Sends the start request and arms the decoder.
    ///
    /// The line is held high for 2 ms, pulled low for 800us and released.
    /// Releasing an open-drain line hands it over to the sensor, which
    /// answers within ~40us, so arming happens right after the release.
    fn start(&mut self) -> Result<u32, DhtError<E>> {
        self.pin.set_high()?;
        self.delay.delay_ms(IDLE_HIGH_MS);

        // MCU sends start request
        self.pin.set_low()?;
        self.delay.delay_us(START_LOW_US);
        self.pin.set_high()?;

        Ok(self.link.arm())
    }

    /// Waits until the frame for `generation` is published or times out.
    fn wait_for_frame(&mut self, generation: u32) -> Result<RawFrame, DhtError<E>> {
        // Partial steps round up so short timeouts still wait.
        for _ in 0..self.response_timeout_us.div_ceil(POLL_STEP_US) {
            if let Some(frame) = self.link.take(generation) {
                return Ok(frame);
            }
            self.delay.delay_us(POLL_STEP_US);
        }

        self.link.take(generation).ok_or_else(|| {
            warn!("no frame within {} us", self.response_timeout_us);
            DhtError::Timeout
        })
    }

    /// Sleeps on the driver's delay provider.
    pub(crate) fn pause_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Releases the line and returns the pin and delay provider.
    pub fn release(mut self) -> (PIN, DELAY) {
        if self.pin.set_high().is_err() {
            warn!("failed to release the data line");
        }
        (self.pin, self.delay)
    }
}
