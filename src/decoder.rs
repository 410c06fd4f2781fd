//! Edge-driven frame decoder.
//!
//! The sensor answers a start request like this:
//!
//! ```text
//!   Host:         ~~~~|__|~~~
//!   Sensor ACK:              |__|~~|
//!   Sensor data:                    |__|~~~|__|~|__ ...
//! ```
//!
//! Every data bit is a low separator followed by a high pulse. A short high
//! pulse (~26us) is a 0, a long one (~70us) is a 1, so a bit is decoded by
//! timing the high pulse between its rising and falling edges.

use embedded_hal::digital::PinState;

use crate::frame::{FRAME_LEN, RawFrame};
use crate::link::FrameLink;

/// High pulses longer than this (in microseconds) encode a 1.
pub const BIT_THRESHOLD_US: u32 = 40;

/// Protocol position of the decoder.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderState {
    /// Waiting for the sensor to acknowledge by pulling the line low.
    AwaitingLow,
    /// Waiting for the end of the acknowledge low pulse.
    AwaitingHigh,
    /// Waiting for the leading low edge of the first data bit.
    AwaitingBitLow,
    /// Waiting for the rising edge that starts a bit's high pulse.
    AwaitingBitHigh,
    /// Waiting for the falling edge that ends a bit's high pulse.
    AwaitingBitFalling,
    /// Frame complete or never armed, all edges are ignored.
    Idle,
}

/// Position of the next bit to be written in the frame, MSB first.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitCursor {
    pub byte_index: usize,
    pub bit_index: u8,
}

impl BitCursor {
    pub const START: BitCursor = BitCursor {
        byte_index: 0,
        bit_index: 7,
    };

    /// Moves to the next bit; the byte advances only when the bit index wraps.
    fn advance(&mut self) {
        if self.bit_index == 0 {
            self.byte_index += 1;
            self.bit_index = 7;
        } else {
            self.bit_index -= 1;
        }
    }

    fn is_complete(&self) -> bool {
        self.byte_index == FRAME_LEN
    }
}

/// State machine reconstructing a frame from level transitions.
#[derive(Debug)]
pub struct EdgeDecoder {
    state: DecoderState,
    cursor: BitCursor,
    frame: [u8; FRAME_LEN],
    pulse_start_us: u32,
}

impl Default for EdgeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeDecoder {
    /// Creates an idle decoder; call [`arm`](Self::arm) before a transaction.
    pub const fn new() -> Self {
        EdgeDecoder {
            state: DecoderState::Idle,
            cursor: BitCursor::START,
            frame: [0; FRAME_LEN],
            pulse_start_us: 0,
        }
    }

    /// Prepares for a new transaction, dropping any partially decoded frame.
    pub fn arm(&mut self) {
        self.state = DecoderState::AwaitingLow;
        self.cursor = BitCursor::START;
        self.frame = [0; FRAME_LEN];
        self.pulse_start_us = 0;
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn cursor(&self) -> BitCursor {
        self.cursor
    }

    /// Bytes decoded so far.
    pub fn partial_frame(&self) -> &[u8; FRAME_LEN] {
        &self.frame
    }

    /// Feeds one transition of the line.
    ///
    /// `timestamp_us` is a free-running microsecond counter; it may wrap.
    /// Returns the frame once the last bit has been decoded.
    pub fn on_transition(&mut self, timestamp_us: u32, level: PinState) -> Option<RawFrame> {
        match (self.state, level) {
            (DecoderState::AwaitingLow, PinState::Low) => {
                self.state = DecoderState::AwaitingHigh;
            }
            (DecoderState::AwaitingHigh, PinState::High) => {
                self.state = DecoderState::AwaitingBitLow;
            }
            (DecoderState::AwaitingBitLow, PinState::Low) => {
                self.cursor = BitCursor::START;
                self.frame = [0; FRAME_LEN];
                self.state = DecoderState::AwaitingBitHigh;
            }
            (DecoderState::AwaitingBitHigh, PinState::High) => {
                self.pulse_start_us = timestamp_us;
                self.state = DecoderState::AwaitingBitFalling;
            }
            (DecoderState::AwaitingBitFalling, PinState::Low) => {
                let elapsed = timestamp_us.wrapping_sub(self.pulse_start_us);
                if elapsed > BIT_THRESHOLD_US {
                    self.frame[self.cursor.byte_index] |= 1 << self.cursor.bit_index;
                }
                self.cursor.advance();

                if self.cursor.is_complete() {
                    self.state = DecoderState::Idle;
                    return Some(RawFrame(self.frame));
                }
                self.state = DecoderState::AwaitingBitHigh;
            }
            // Repeated levels and everything after completion are noise.
            (DecoderState::AwaitingLow, PinState::High)
            | (DecoderState::AwaitingHigh, PinState::Low)
            | (DecoderState::AwaitingBitLow, PinState::High)
            | (DecoderState::AwaitingBitHigh, PinState::Low)
            | (DecoderState::AwaitingBitFalling, PinState::High)
            | (DecoderState::Idle, _) => {}
        }
        None
    }
}

/// Entry point for the edge notification context.
///
/// Owns the [`EdgeDecoder`] and applies `arm()` requests made through the
/// [`FrameLink`] before processing the next transition.
#[derive(Debug)]
pub struct EdgeHandler<'a> {
    link: &'a FrameLink,
    decoder: EdgeDecoder,
    generation: u32,
}

impl<'a> EdgeHandler<'a> {
    /// Binds a handler to `link`. Edges are ignored until the link is armed.
    pub fn new(link: &'a FrameLink) -> Self {
        EdgeHandler {
            link,
            decoder: EdgeDecoder::new(),
            generation: link.generation(),
        }
    }

    pub fn decoder(&self) -> &EdgeDecoder {
        &self.decoder
    }

    /// Called for every rising and falling edge, in chronological order.
    pub fn on_transition(&mut self, timestamp_us: u32, level: PinState) {
        let generation = self.link.generation();
        if generation != self.generation {
            self.generation = generation;
            self.decoder.arm();
        }

        if let Some(frame) = self.decoder.on_transition(timestamp_us, level) {
            self.link.publish(self.generation, frame);
        }
    }
}
