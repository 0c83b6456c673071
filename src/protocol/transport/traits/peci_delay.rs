//! Timing primitives required by the engine: a busy-wait for the
//! sub-millisecond polls and an asynchronous sleep for resets and
//! event-driven timeouts.

/// Delay provider; must remain thread-safe when applicable.
pub trait PeciDelay {
    /// Spin for `micros` microseconds without yielding.
    fn delay_us(&mut self, micros: u32);

    /// Asynchronously wait for `millis` milliseconds.
    fn delay_ms<'a>(&'a mut self, millis: u32) -> impl core::future::Future<Output = ()> + 'a;

    /// Whether the caller runs in interrupt context, where sleeping is not
    /// allowed and resets fall back to busy-waiting.
    fn in_interrupt(&self) -> bool {
        false
    }
}
