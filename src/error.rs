use crate::frame::Reading;

/// Possible errors from the AM2301 driver.
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// No complete frame arrived before the response deadline.
    Timeout,
    /// Checksum did not match the received data.
    ChecksumMismatch,
    /// The frame checksums correctly but jumps too far from the previous decode.
    Implausible {
        /// Previous raw decode the frame was compared against.
        previous: Reading,
        /// The rejected decode.
        current: Reading,
    },
    /// Error from the GPIO pin (input/output).
    PinError(E),
}

impl<E> DhtError<E> {
    /// Short static name of the error, suitable for log output.
    pub fn kind(&self) -> &'static str {
        match self {
            DhtError::Timeout => "timeout",
            DhtError::ChecksumMismatch => "checksum mismatch",
            DhtError::Implausible { .. } => "implausible reading",
            DhtError::PinError(_) => "pin error",
        }
    }

    /// Whether the frame itself was received but rejected.
    ///
    /// Rejected frames are retried quickly, line failures wait a full interval.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DhtError::ChecksumMismatch | DhtError::Implausible { .. }
        )
    }
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}
