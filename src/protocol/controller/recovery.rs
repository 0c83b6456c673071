//! Error classification and bus recovery.
use super::PeciController;
use crate::error::PeciError;
use crate::infra::registers::{Control, ErrorFlags, PeciRegisters, Register, Status1};
use crate::protocol::completion::CompletionWaiter;
use crate::protocol::transport::traits::peci_delay::PeciDelay;

impl<R, D, W> PeciController<R, D, W>
where
    R: PeciRegisters,
    D: PeciDelay,
    W: CompletionWaiter,
{
    /// Close the transaction: acknowledge end-of-frame and check the error
    /// register.
    ///
    /// Latched errors are cleared, the FIFOs are reset and the transaction
    /// fails with [`PeciError::IoError`]. This path never escalates to a full
    /// reset.
    pub fn finish_transaction(&mut self) -> Result<(), PeciError> {
        if self.regs.status1().contains(Status1::EOF) {
            self.regs.write(Register::Status1, Status1::EOF.bits());
        }

        let raw = self.regs.read(Register::Error);
        if raw == 0 {
            return Ok(());
        }
        let flags = ErrorFlags::from_bits_retain(raw);

        #[cfg(feature = "defmt")]
        {
            for cause in crate::infra::registers::classify(flags) {
                defmt::error!("{=str}", cause);
            }
            defmt::debug!("PECI err {=u8:x}", raw);
            defmt::debug!("PECI sts1 {=u8:x}", self.regs.read(Register::Status1));
            defmt::debug!("PECI sts2 {=u8:x}", self.regs.read(Register::Status2));
        }

        // ERROR is write-one-to-clear: echo the value read, never a rebuilt mask.
        self.regs.write(Register::Error, raw);
        self.reset_fifos();

        Err(PeciError::IoError { flags })
    }

    /// Bring the bus back to a usable state.
    ///
    /// `full_reset` cycles the whole controller and re-applies the last
    /// bitrate; otherwise only the internal FIFOs are flushed, leaving the bit
    /// timing untouched.
    pub async fn recover(&mut self, full_reset: bool) {
        #[cfg(feature = "defmt")]
        defmt::warn!("bus recovery full_reset:{}", full_reset);

        if !full_reset {
            self.reset_fifos();
            return;
        }

        self.regs
            .write(Register::Control, (Control::PD | Control::RST).bits());

        if self.delay.in_interrupt() {
            self.delay
                .delay_us(self.config.reset_delay_ms.saturating_mul(1_000));
        } else {
            self.delay.delay_ms(self.config.reset_delay_ms).await;
        }

        self.regs.clear_bits(Register::Control, Control::RST.bits());

        // Divisor validated by `new` or `configure`.
        self.apply_bit_time();
    }

    /// Flush the internal FIFOs. The flag stays set until the next write.
    fn reset_fifos(&mut self) {
        self.regs.set_bits(Register::Control, Control::FRST.bits());
    }
}
