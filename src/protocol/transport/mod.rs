//! PECI transport layer: timing constants and the traits that plug the engine
//! into a platform (register block, delays, interrupt line, bus contract).
//!
//! ## PECI Timing Constants
//!
//! These values bound every wait performed by the engine. None of the waits
//! may block forever; each one ends in success or a typed error.

#[cfg(feature = "embassy-time")]
pub mod embassy_delay;
pub mod traits;

/// Maximum PECI core clock in kHz (48 MHz main clock).
///
/// The bit-time divisor is `MAX_PECI_CORE_CLOCK_KHZ / bitrate_kbps`.
pub const MAX_PECI_CORE_CLOCK_KHZ: u32 = 48_000;

/// Bitrate assumed until `configure` is called (kbps).
pub const DEFAULT_BITRATE_KBPS: u32 = 1_000;

/// Delay between two polls of the idle bit (µs).
pub const IDLE_POLL_DELAY_US: u32 = 100;

/// Number of idle polls before reporting a busy bus.
///
/// 50 × 100 µs → the bus must go idle within 5 ms.
pub const IDLE_POLL_ATTEMPTS: u32 = 50;

/// Settle delay after setting TXEN, and the period of the end-of-frame and
/// read FIFO polls (µs).
///
/// The end-of-frame status is not meaningful before this delay elapsed.
pub const IO_DELAY_US: u32 = 10;

/// End-of-frame polls before a transmit timeout.
///
/// Worst case 100 × 10 µs = 1 ms.
pub const EOF_POLL_ATTEMPTS: u32 = 100;

/// Read FIFO polls per response byte before a receive timeout.
///
/// Worst case 100 × 10 µs = 1 ms per byte.
pub const RX_POLL_ATTEMPTS: u32 = 100;

/// Consecutive transmit timeouts tolerated before a full controller reset.
pub const TIMEOUT_RETRIES: u32 = 3;

/// Time the controller is held in reset (ms).
pub const RESET_DELAY_MS: u32 = 1;

/// Event-driven completion budget per frame byte (ms).
pub const EVENT_TIMEOUT_PER_BYTE_MS: u32 = 10;
