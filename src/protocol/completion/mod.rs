//! End-of-frame detection.
//!
//! Two interchangeable strategies share one contract: after TXEN is set,
//! resolve to `Ok(())` once the frame is out, or to [`PeciError::Timeout`]
//! once the budget is spent. Neither blocks forever.
//!
//! * [`PolledCompletion`] spins on the end-of-frame status bit.
//! * [`SignalCompletion`] suspends the task on a single-slot
//!   [`Signal`] posted by [`InterruptHandler::on_interrupt`].
//!
//! The strategy is picked when the controller is constructed, so both paths
//! live in the same build.
use embassy_sync::{blocking_mutex::raw::RawMutex, signal::Signal};
use futures_util::{
    future::{select, Either},
    pin_mut, Future,
};

use crate::config::PeciConfig;
use crate::core::HEADER_LEN;
use crate::error::PeciError;
use crate::infra::registers::{Control, IntEn1, IntEn2, PeciRegisters, Register, Status1, Status2};
use crate::protocol::transport::traits::{interrupt_line::InterruptLine, peci_delay::PeciDelay};

/// Strategy used by the writer to wait for the end of a frame.
pub trait CompletionWaiter {
    /// Called right before TXEN is set.
    fn arm(&mut self) {}

    /// Program the controller interrupt enables. Called at init and after
    /// every reconfiguration, since both clear the control register.
    fn program<R: PeciRegisters>(&mut self, _regs: &R) {}

    /// Route the controller interrupt to the CPU.
    fn unmask(&mut self) {}

    /// Stop routing the controller interrupt to the CPU.
    fn mask(&mut self) {}

    /// Wait until the frame of `write_length` bytes is transmitted.
    fn wait_complete<'a, R: PeciRegisters, D: PeciDelay>(
        &'a mut self,
        regs: &'a R,
        delay: &'a mut D,
        config: &'a PeciConfig,
        write_length: u8,
    ) -> impl Future<Output = Result<(), PeciError>> + 'a;
}

//==================================================================================POLLED
/// Busy-polls the end-of-frame bit.
///
/// Worst case `eof_poll_attempts × io_delay_us` (1 ms by default).
#[derive(Debug, Default, Clone, Copy)]
pub struct PolledCompletion;

impl CompletionWaiter for PolledCompletion {
    fn wait_complete<'a, R: PeciRegisters, D: PeciDelay>(
        &'a mut self,
        regs: &'a R,
        delay: &'a mut D,
        config: &'a PeciConfig,
        _write_length: u8,
    ) -> impl Future<Output = Result<(), PeciError>> + 'a {
        async move {
            for _ in 0..config.eof_poll_attempts {
                if regs.status1().contains(Status1::EOF) {
                    return Ok(());
                }
                delay.delay_us(config.io_delay_us);
            }

            #[cfg(feature = "defmt")]
            defmt::warn!("Tx timeout");
            Err(PeciError::Timeout)
        }
    }
}

//==================================================================================SIGNAL
/// Waits for the interrupt handler to post the completion signal.
///
/// The budget is `event_timeout_per_byte_ms` for every byte of the frame,
/// header included.
pub struct SignalCompletion<'a, M: RawMutex, I: InterruptLine> {
    signal: &'a Signal<M, ()>,
    line: &'a I,
}

impl<'a, M: RawMutex, I: InterruptLine> SignalCompletion<'a, M, I> {
    pub fn new(signal: &'a Signal<M, ()>, line: &'a I) -> Self {
        Self { signal, line }
    }

    /// Build the matching interrupt handler over `regs`.
    pub fn handler<R: PeciRegisters>(&self, regs: R) -> InterruptHandler<'a, R, M, I> {
        InterruptHandler::new(regs, self.signal, self.line)
    }
}

impl<M: RawMutex, I: InterruptLine> CompletionWaiter for SignalCompletion<'_, M, I> {
    fn arm(&mut self) {
        // Drop a completion left over by an earlier frame.
        self.signal.reset();
    }

    fn program<R: PeciRegisters>(&mut self, regs: &R) {
        regs.write(Register::IntEn1, (IntEn1::EREN | IntEn1::EIEN).bits());
        regs.set_bits(Register::IntEn2, (IntEn2::ENWFE | IntEn2::ENRFF).bits());
        regs.set_bits(Register::Control, Control::MIEN.bits());
    }

    fn unmask(&mut self) {
        self.line.clear_pending();
        self.line.enable();
    }

    fn mask(&mut self) {
        self.line.clear_pending();
        self.line.disable();
    }

    fn wait_complete<'a, R: PeciRegisters, D: PeciDelay>(
        &'a mut self,
        _regs: &'a R,
        delay: &'a mut D,
        config: &'a PeciConfig,
        write_length: u8,
    ) -> impl Future<Output = Result<(), PeciError>> + 'a {
        async move {
            let frame_len = HEADER_LEN as u32 + u32::from(write_length);
            let timeout_ms = config.event_timeout_per_byte_ms.saturating_mul(frame_len);

            let done = self.signal.wait();
            let timer = delay.delay_ms(timeout_ms);
            pin_mut!(done);
            pin_mut!(timer);

            match select(done, timer).await {
                Either::Left(_) => Ok(()),
                Either::Right(_) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Tx timeout after {} ms", timeout_ms);
                    Err(PeciError::Timeout)
                }
            }
        }
    }
}

//==================================================================================INTERRUPT_HANDLER
/// Body of the controller ISR, the producer side of [`SignalCompletion`].
///
/// Registration on the IRQ vector is left to the platform, which calls
/// [`on_interrupt`](Self::on_interrupt) from its handler.
pub struct InterruptHandler<'a, R, M: RawMutex, I: InterruptLine> {
    regs: R,
    signal: &'a Signal<M, ()>,
    line: &'a I,
}

impl<'a, R: PeciRegisters, M: RawMutex, I: InterruptLine> InterruptHandler<'a, R, M, I> {
    pub fn new(regs: R, signal: &'a Signal<M, ()>, line: &'a I) -> Self {
        Self { regs, signal, line }
    }

    /// Acknowledge the source, clear latched errors and wake the writer when
    /// the write FIFO drained.
    pub fn on_interrupt(&self) {
        let error = self.regs.read(Register::Error);
        let status2 = self.regs.status2();

        self.line.clear_pending();

        if error != 0 {
            // Write-one-to-clear: echo exactly what was latched.
            self.regs.write(Register::Error, error);
        }

        if status2.contains(Status2::WFE) {
            #[cfg(feature = "defmt")]
            defmt::warn!("TX FIFO empty ST2:{=u8:x}", status2.bits());
            self.signal.signal(());
        }

        if status2.contains(Status2::RFF) {
            #[cfg(feature = "defmt")]
            defmt::warn!("RX FIFO full ST2:{=u8:x}", status2.bits());
        }
    }
}
