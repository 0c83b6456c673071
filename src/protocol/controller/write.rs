//! Transaction writer: fills the write FIFO and drives TXEN.
use super::PeciController;
use crate::core::Request;
use crate::error::PeciError;
use crate::infra::registers::{Control, PeciRegisters, Register, Status1, Status2};
use crate::protocol::completion::CompletionWaiter;
use crate::protocol::transport::traits::peci_delay::PeciDelay;

impl<R, D, W> PeciController<R, D, W>
where
    R: PeciRegisters,
    D: PeciDelay,
    W: CompletionWaiter,
{
    /// Queue `request` in the write FIFO, transmit it and wait for the end of
    /// the frame.
    ///
    /// A transmit timeout triggers recovery before returning: FIFO reset for
    /// the first `timeout_retries` consecutive timeouts, full controller reset
    /// beyond that.
    pub async fn write(&mut self, request: &Request<'_>) -> Result<(), PeciError> {
        // Nothing is written when the FIFO is already full.
        if self.regs.status2().contains(Status2::WFF) {
            #[cfg(feature = "defmt")]
            defmt::warn!("write: FIFO is full");
            return Err(PeciError::FifoFull);
        }

        // A pending FIFO reset would discard the new frame.
        self.regs.clear_bits(Register::Control, Control::FRST.bits());

        // End-of-frame left over by an aborted read would end the next poll early.
        if self.regs.status1().contains(Status1::EOF) {
            self.regs.write(Register::Status1, Status1::EOF.bits());
        }

        // Header: address, write length, read length.
        self.regs.write(Register::WriteData, request.address());
        self.regs.write(Register::WriteData, request.write_length());
        self.regs.write(Register::WriteData, request.read_length());

        if request.write_length() != 0 {
            self.regs.write(Register::WriteData, request.command());
            for &byte in request.payload() {
                // Fire-and-forget FIFO: bytes that do not fit are dropped.
                if !self.regs.status2().contains(Status2::WFF) {
                    self.regs.write(Register::WriteData, byte);
                }
            }
        }

        self.wait_idle()?;

        self.waiter.arm();
        self.regs.set_bits(Register::Control, Control::TXEN.bits());
        self.delay.delay_us(self.config.io_delay_us);

        let completion = self
            .waiter
            .wait_complete(
                &self.regs,
                &mut self.delay,
                &self.config,
                request.write_length(),
            )
            .await;

        match completion {
            Ok(()) => {
                self.timeout_retries = 0;
                Ok(())
            }
            Err(err) => {
                self.timeout_retries = self.timeout_retries.saturating_add(1);
                // Full reset only after several consecutive failures.
                let full_reset = self.timeout_retries > self.config.timeout_retries;
                self.recover(full_reset).await;
                Err(err)
            }
        }
    }
}
