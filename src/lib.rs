//! AM2301 Sensor Driver for Embedded Rust
//!
//! This crate provides a platform-agnostic, interrupt-driven driver for the
//! AM2301 (DHT21) temperature and humidity sensor, built on top of the
//! [`embedded-hal`] traits.
//!
//! Instead of busy-waiting on the data line, bits are decoded from edge
//! notifications: the host's GPIO interrupt calls
//! [`EdgeHandler::on_transition`] for every rising and falling edge, while
//! [`Am2301`] sends the start request and waits, with a bounded timeout, for
//! the finished frame. The two sides meet only at a [`FrameLink`].
//!
//! Frames then go through a [`Filter`] that rejects bad checksums and
//! implausible jumps, and the last accepted reading is kept in a
//! [`SensorState`] together with quality counters. [`Poller`] ties it all
//! together at a cadence that re-checks quickly after a failure.
//!
//! ```ignore
//! static LINK: FrameLink = FrameLink::new();
//! static STATE: SensorState = SensorState::new();
//! static STOP: StopSignal = StopSignal::new();
//!
//! // In the GPIO interrupt (both edges):
//! handler.on_transition(now_us(), level);
//!
//! // In the polling task:
//! let sensor = Am2301::new(pin, delay, &LINK, &STATE);
//! let (pin, delay) = Poller::new(sensor, PollConfig::new(30)).run(&STOP);
//!
//! // Anywhere:
//! let snapshot = STATE.snapshot();
//! println!("{} C, {} %RH", snapshot.temperature(), snapshot.humidity());
//! ```
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Designed for `no_std` environments, lock-free state sharing
//! - Optional logging support via `defmt` or `log`
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and logs through `defmt`
//! - `log`: Logs through the `log` facade
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod am2301;
pub mod config;
pub mod decoder;
pub mod error;
pub mod filter;
pub mod frame;
pub mod link;
pub mod poller;
pub mod report;
pub mod state;

pub use am2301::Am2301;
pub use config::PollConfig;
pub use decoder::{BitCursor, DecoderState, EdgeDecoder, EdgeHandler};
pub use error::DhtError;
pub use filter::{Filter, Verdict, validate};
pub use frame::{RawFrame, Reading};
pub use link::FrameLink;
pub use poller::{Poller, StopSignal};
pub use report::{Reported, Tenths};
pub use state::{QualityCounters, SensorState, Snapshot};
