//! Error definitions shared across library modules.
//! Each variant models a distinct failure of a PECI operation so callers can
//! tell a busy bus from a timed-out frame or a controller-reported fault.
use crate::infra::registers::ErrorFlags;
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Failures reported by the PECI engine.
pub enum PeciError {
    /// The bus never reported idle within the polling budget.
    #[error("PECI bus is busy")]
    BusBusy,
    /// The write FIFO was already full before the transaction started.
    #[error("Write FIFO is full")]
    FifoFull,
    /// Transmit or receive phase exceeded its time budget.
    #[error("PECI transaction timed out")]
    Timeout,
    /// The controller flagged an error at the end of the transaction.
    #[error("PECI I/O error: {flags:?}")]
    IoError { flags: ErrorFlags },
    /// Requested bitrate cannot be expressed by the bit-timing divisor.
    #[error("Invalid bitrate: {bitrate} kbps")]
    InvalidBitrate { bitrate: u32 },
    /// Request does not fit the frame header or the buffer bounds.
    #[error("Invalid request")]
    InvalidRequest,
}
