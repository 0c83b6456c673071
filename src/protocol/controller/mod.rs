//! PECI controller engine.
//!
//! Owns the register block, the delay provider and the completion strategy of
//! one physical bus, plus the only state that spans transactions: the last
//! configured bitrate and the consecutive transmit-timeout counter.
//!
//! A transaction is strictly sequential:
//!
//! 1. [`write`](PeciController::write): header + write block into the FIFO,
//!    idle check, TXEN, wait for end-of-frame.
//! 2. [`read`](PeciController::read): only when a response is expected or
//!    the command is a ping.
//! 3. [`finish_transaction`](PeciController::finish_transaction): clear the
//!    end-of-frame flag and turn latched errors into [`PeciError::IoError`].
//!
//! The engine is not reentrant; `&mut self` guarantees a single transaction
//! in flight. Use [`SharedPeci`](crate::protocol::shared::SharedPeci) to
//! share one controller between tasks.
mod read;
mod recovery;
mod write;

use futures_util::Future;

use crate::config::PeciConfig;
use crate::core::{Request, Response};
use crate::error::PeciError;
use crate::infra::registers::{
    Control, PeciRegisters, Register, Status2, BIT_TIME_MSB_MASK, BIT_TIME_MSB_SHIFT,
};
use crate::protocol::completion::CompletionWaiter;
use crate::protocol::transport::traits::{peci_bus::PeciBus, peci_delay::PeciDelay};

/// Driver for a FIFO-based PECI controller.
pub struct PeciController<R, D, W> {
    /// Controller register block.
    regs: R,
    /// Busy-wait and sleep provider.
    delay: D,
    /// End-of-frame strategy (polled or interrupt driven).
    waiter: W,
    /// Timing budgets.
    config: PeciConfig,
    /// Last bitrate programmed (kbps).
    bitrate: u32,
    /// Divisor of `bitrate`, re-applied after a full reset.
    divisor: u16,
    /// Consecutive transmit timeouts.
    timeout_retries: u32,
}

impl<R, D, W> PeciController<R, D, W>
where
    R: PeciRegisters,
    D: PeciDelay,
    W: CompletionWaiter,
{
    /// Wrap a register block. No register is touched until [`init`](Self::init)
    /// or [`configure`](Self::configure).
    ///
    /// Fails with [`PeciError::InvalidBitrate`] when the default bitrate of
    /// `config` cannot be programmed on its core clock, since a full reset
    /// before any `configure` falls back to it.
    pub fn new(regs: R, delay: D, waiter: W, config: PeciConfig) -> Result<Self, PeciError> {
        let divisor = bit_time_divisor(config.max_core_clock_khz, config.default_bitrate_kbps)?;

        Ok(Self {
            regs,
            delay,
            waiter,
            bitrate: config.default_bitrate_kbps,
            divisor,
            config,
            timeout_retries: 0,
        })
    }

    /// Register block driven by this controller.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Completion strategy.
    pub fn waiter(&self) -> &W {
        &self.waiter
    }

    pub fn config(&self) -> &PeciConfig {
        &self.config
    }

    /// Last bitrate programmed (kbps).
    pub fn bitrate(&self) -> u32 {
        self.bitrate
    }

    /// Consecutive transmit timeouts since the last completed frame.
    pub fn timeout_retries(&self) -> u32 {
        self.timeout_retries
    }

    /// One-time controller bring-up: pulse the reset and let the completion
    /// strategy program its interrupt enables.
    pub async fn init(&mut self) {
        self.regs.set_bits(Register::Control, Control::RST.bits());
        self.delay.delay_ms(self.config.reset_delay_ms).await;
        self.regs.clear_bits(Register::Control, Control::RST.bits());

        self.waiter.program(&self.regs);
    }

    /// Program the bit timing for `bitrate` (kbps).
    ///
    /// The interface is powered down while the divisor changes, which aborts
    /// any frame in flight. Must not be called during a transaction.
    pub fn configure(&mut self, bitrate: u32) -> Result<(), PeciError> {
        let divisor = bit_time_divisor(self.config.max_core_clock_khz, bitrate)?;
        self.bitrate = bitrate;
        self.divisor = divisor;
        self.apply_bit_time();
        Ok(())
    }

    /// Program the cached divisor, interface powered down meanwhile.
    fn apply_bit_time(&mut self) {
        let (lsb, msb) = split_divisor(self.divisor);

        self.regs.write(Register::Control, Control::PD.bits());
        self.regs.write(Register::BitTimeLsb, lsb);
        self.regs.write(Register::BitTimeMsb, msb);
        self.regs.clear_bits(Register::Control, Control::PD.bits());

        self.waiter.program(&self.regs);
    }

    /// Power the interface up.
    pub fn enable(&mut self) -> Result<(), PeciError> {
        self.regs.clear_bits(Register::Control, Control::PD.bits());
        self.waiter.unmask();
        Ok(())
    }

    /// Power the interface down once the bus is idle.
    pub fn disable(&mut self) -> Result<(), PeciError> {
        // Never cut a frame in half.
        self.wait_idle()?;

        self.waiter.mask();
        self.regs.set_bits(Register::Control, Control::PD.bits());
        Ok(())
    }

    /// Poll the idle bit until the wire is quiet.
    ///
    /// The controller raises no interrupt when IDLE changes, so this always
    /// polls, `idle_poll_attempts × idle_poll_delay_us` at most.
    pub fn wait_idle(&mut self) -> Result<(), PeciError> {
        let mut attempts = self.config.idle_poll_attempts;

        while !self.regs.status2().contains(Status2::IDLE) {
            self.delay.delay_us(self.config.idle_poll_delay_us);
            attempts = attempts.saturating_sub(1);

            if attempts == 0 {
                #[cfg(feature = "defmt")]
                defmt::warn!("Bus is busy");
                return Err(PeciError::BusBusy);
            }
        }
        Ok(())
    }

    /// Run one transaction: write, optional read, then error check.
    pub async fn transfer(&mut self, request: Request<'_>) -> Result<Response, PeciError> {
        self.write(&request).await?;

        // A ping is read back to fetch the write FCS, which is its answer.
        let response = if request.expects_read() {
            self.read(request.read_length(), request.command())?
        } else {
            Response::new()
        };

        self.finish_transaction()?;
        Ok(response)
    }
}

impl<R, D, W> PeciBus for PeciController<R, D, W>
where
    R: PeciRegisters,
    D: PeciDelay,
    W: CompletionWaiter,
{
    type Error = PeciError;

    fn configure(&mut self, bitrate: u32) -> Result<(), Self::Error> {
        PeciController::configure(self, bitrate)
    }

    fn enable(&mut self) -> Result<(), Self::Error> {
        PeciController::enable(self)
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        PeciController::disable(self)
    }

    fn transfer<'a>(
        &'a mut self,
        request: Request<'a>,
    ) -> impl Future<Output = Result<Response, Self::Error>> + 'a {
        PeciController::transfer(self, request)
    }
}

//==================================================================================BIT_TIME
/// Optimal bit-time divisor for `bitrate` kbps on a `core_clock_khz` core.
///
/// Fails when `bitrate` is zero or faster than the core clock.
pub fn bit_time_divisor(core_clock_khz: u32, bitrate: u32) -> Result<u16, PeciError> {
    if bitrate == 0 {
        return Err(PeciError::InvalidBitrate { bitrate });
    }

    match u16::try_from(core_clock_khz / bitrate) {
        Ok(divisor) if divisor != 0 => Ok(divisor),
        _ => Err(PeciError::InvalidBitrate { bitrate }),
    }
}

/// Split a divisor into the low byte and the masked high field.
pub fn split_divisor(divisor: u16) -> (u8, u8) {
    let lsb = (divisor & 0xFF) as u8;
    let msb = ((divisor >> BIT_TIME_MSB_SHIFT) as u8) & BIT_TIME_MSB_MASK;
    (lsb, msb)
}
