//! Transaction reader: drains the read FIFO into a [`Response`].
//!
//! The read FIFO returns, in order, the write FCS, the response bytes and the
//! read FCS. Only the response bytes reach the caller, except for a ping
//! whose whole answer is the write FCS.
use super::PeciController;
use crate::core::{command, Response, FCS_LEN};
use crate::error::PeciError;
use crate::infra::registers::{PeciRegisters, Register, Status2};
use crate::protocol::completion::CompletionWaiter;
use crate::protocol::transport::traits::peci_delay::PeciDelay;

impl<R, D, W> PeciController<R, D, W>
where
    R: PeciRegisters,
    D: PeciDelay,
    W: CompletionWaiter,
{
    /// Drain `expected_length` response bytes plus both frame check bytes.
    ///
    /// A byte that never shows up in the read FIFO fails the read with
    /// [`PeciError::Timeout`], so on success every expected slot was drained.
    /// The one count mismatch left is a ping asked for a response: its answer
    /// is the write FCS alone, which is logged. The read FCS is not checked
    /// against the payload.
    pub fn read(&mut self, expected_length: u8, command_code: u8) -> Result<Response, PeciError> {
        let expected = usize::from(expected_length);
        let slots = expected + FCS_LEN;

        let mut response = Response::new();
        response.set_len(expected);

        for slot in 0..slots {
            self.wait_rx_ready()?;
            let byte = self.regs.read(Register::ReadData);

            if slot == 0 {
                #[cfg(feature = "defmt")]
                defmt::debug!("TX FCS {=u8:x}", byte);
                response.set_write_fcs(byte);

                if command_code == command::PING {
                    response.set_ping_answer(byte);
                    break;
                }
            } else if slot == expected + 1 {
                response.set_read_fcs(byte);
            } else {
                response.push_payload(slot - 1, byte);
            }
        }

        // Only a ping with a non-zero read length lands here.
        if response.received() != expected {
            #[cfg(feature = "defmt")]
            defmt::info!("Incomplete {} vs {}", response.received(), expected);
        }

        // Quiet bus before any later FIFO reset.
        self.wait_idle()?;

        Ok(response)
    }

    /// Wait for one byte in the read FIFO, `rx_poll_attempts × io_delay_us` at most.
    fn wait_rx_ready(&mut self) -> Result<(), PeciError> {
        let mut attempts = self.config.rx_poll_attempts;

        while self.regs.status2().contains(Status2::RFE) {
            self.delay.delay_us(self.config.io_delay_us);
            attempts = attempts.saturating_sub(1);

            if attempts == 0 {
                #[cfg(feature = "defmt")]
                defmt::warn!("Rx buffer empty");
                return Err(PeciError::Timeout);
            }
        }
        Ok(())
    }
}
