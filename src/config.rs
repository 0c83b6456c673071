//! Runtime configuration of a PECI controller instance.
//!
//! Every field defaults to the matching constant in
//! [`protocol::transport`](crate::protocol::transport). Boards with a
//! different core clock or slower clients override individual fields:
//!
//! ```rust,ignore
//! let config = PeciConfig {
//!     max_core_clock_khz: 24_000,
//!     ..PeciConfig::default()
//! };
//! ```
use crate::protocol::transport::{
    DEFAULT_BITRATE_KBPS, EOF_POLL_ATTEMPTS, EVENT_TIMEOUT_PER_BYTE_MS, IDLE_POLL_ATTEMPTS,
    IDLE_POLL_DELAY_US, IO_DELAY_US, MAX_PECI_CORE_CLOCK_KHZ, RESET_DELAY_MS, RX_POLL_ATTEMPTS,
    TIMEOUT_RETRIES,
};

/// Timing budgets and clocking of one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeciConfig {
    /// PECI core clock (kHz).
    pub max_core_clock_khz: u32,
    /// Bitrate applied by a full reset when `configure` was never called (kbps).
    pub default_bitrate_kbps: u32,
    /// Delay between idle polls (µs).
    pub idle_poll_delay_us: u32,
    /// Idle polls before `BusBusy`.
    pub idle_poll_attempts: u32,
    /// TXEN settle delay and FIFO poll period (µs).
    pub io_delay_us: u32,
    /// End-of-frame polls before a transmit `Timeout`.
    pub eof_poll_attempts: u32,
    /// Read FIFO polls per byte before a receive `Timeout`.
    pub rx_poll_attempts: u32,
    /// Consecutive transmit timeouts before escalating to a full reset.
    pub timeout_retries: u32,
    /// Reset hold time (ms).
    pub reset_delay_ms: u32,
    /// Event-driven completion budget per frame byte (ms).
    pub event_timeout_per_byte_ms: u32,
}

impl Default for PeciConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PeciConfig {
    pub const fn new() -> Self {
        Self {
            max_core_clock_khz: MAX_PECI_CORE_CLOCK_KHZ,
            default_bitrate_kbps: DEFAULT_BITRATE_KBPS,
            idle_poll_delay_us: IDLE_POLL_DELAY_US,
            idle_poll_attempts: IDLE_POLL_ATTEMPTS,
            io_delay_us: IO_DELAY_US,
            eof_poll_attempts: EOF_POLL_ATTEMPTS,
            rx_poll_attempts: RX_POLL_ATTEMPTS,
            timeout_retries: TIMEOUT_RETRIES,
            reset_delay_ms: RESET_DELAY_MS,
            event_timeout_per_byte_ms: EVENT_TIMEOUT_PER_BYTE_MS,
        }
    }
}
