/// Default bound on the wait for a complete frame (in microseconds).
///
/// A full frame takes about 5 ms on the wire.
pub const DEFAULT_RESPONSE_TIMEOUT_US: u32 = 50_000;

/// Polling cadence and transaction timing.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Ticks to wait after a stable reading or a line failure.
    ///
    /// With the default one-second tick this is the polling interval in seconds.
    pub base_interval_s: u32,
    /// Ticks to wait after a rejected frame or the first accepted reading.
    pub short_delay_ticks: u32,
    /// Scheduler tick length; stop requests are noticed within one tick.
    pub tick_ms: u32,
    /// How long to wait for the sensor to deliver a complete frame.
    pub response_timeout_us: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PollConfig {
    /// Default configuration with a custom polling interval.
    pub const fn new(base_interval_s: u32) -> Self {
        Self {
            base_interval_s,
            short_delay_ticks: 3,
            tick_ms: 1000,
            response_timeout_us: DEFAULT_RESPONSE_TIMEOUT_US,
        }
    }
}
