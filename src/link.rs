//! Handoff between the edge notification context and the polling context.
//!
//! The polling side arms a new transaction by bumping a generation counter.
//! The notification side resets its decoder when it observes a new
//! generation and publishes the finished frame tagged with that generation.
//! Each side only ever writes its own words, so no lock is needed and the
//! link can live in a `static`.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::frame::RawFrame;

const READY: u32 = 1 << 31;
const GENERATION_MASK: u32 = 0x007F_FFFF;

/// Single-producer / single-consumer completion signal carrying one frame.
#[derive(Debug)]
pub struct FrameLink {
    generation: AtomicU32,
    /// Data bytes 0..4, big-endian.
    data: AtomicU32,
    /// `READY | generation << 8 | checksum`, or 0 while empty.
    status: AtomicU32,
}

impl Default for FrameLink {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLink {
    pub const fn new() -> Self {
        FrameLink {
            generation: AtomicU32::new(0),
            data: AtomicU32::new(0),
            status: AtomicU32::new(0),
        }
    }

    /// Starts a new transaction and returns its generation.
    ///
    /// Any frame still in flight from an earlier generation is discarded.
    pub fn arm(&self) -> u32 {
        self.status.store(0, Ordering::Release);
        self.generation
            .fetch_add(1, Ordering::AcqRel)
            .wrapping_add(1)
            & GENERATION_MASK
    }

    /// Generation of the most recent `arm()`.
    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Acquire) & GENERATION_MASK
    }

    /// Publishes a completed frame for `generation`.
    pub(crate) fn publish(&self, generation: u32, frame: RawFrame) {
        let [a, b, c, d, checksum] = frame.0;
        self.data
            .store(u32::from_be_bytes([a, b, c, d]), Ordering::Relaxed);
        self.status.store(
            READY | (generation & GENERATION_MASK) << 8 | checksum as u32,
            Ordering::Release,
        );
    }

    /// Returns the frame completed for `generation`, if there is one.
    pub fn take(&self, generation: u32) -> Option<RawFrame> {
        let status = self.status.load(Ordering::Acquire);
        if status & READY == 0 || (status >> 8) & GENERATION_MASK != generation {
            return None;
        }
        let [a, b, c, d] = self.data.load(Ordering::Relaxed).to_be_bytes();
        Some(RawFrame([a, b, c, d, status as u8]))
    }
}
