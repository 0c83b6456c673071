//! [`PeciDelay`] backed by the embassy time driver.
use crate::protocol::transport::traits::peci_delay::PeciDelay;
use embassy_time::{block_for, Duration, Timer};

/// Delay provider for firmware running an embassy time driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyDelay;

impl PeciDelay for EmbassyDelay {
    fn delay_us(&mut self, micros: u32) {
        block_for(Duration::from_micros(micros as u64));
    }

    async fn delay_ms(&mut self, millis: u32) {
        Timer::after(Duration::from_millis(millis as u64)).await;
    }
}
