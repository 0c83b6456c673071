//! Register model of a FIFO-based PECI controller.
//!
//! The controller exposes byte-wide registers: control, two status registers,
//! an error register, the write/read FIFO data ports, the optimal bit-time
//! divisor and two interrupt-enable registers. Platform code maps them onto
//! the real MMIO block by implementing [`PeciRegisters`]; the engine only
//! speaks in terms of [`Register`] and the typed masks below.
//!
//! STATUS1 and ERROR are write-one-to-clear. STATUS2 is read-only.
use bitflags::bitflags;

//==================================================================================REGISTER
/// Registers of the PECI controller block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Write data port, feeds the write FIFO.
    WriteData,
    /// Read data port, drains the read FIFO.
    ReadData,
    /// Power down, resets, transmit enable, master interrupt enable.
    Control,
    /// Frame progress flags (write-one-to-clear).
    Status1,
    /// FIFO levels and bus idle (read-only).
    Status2,
    /// Error flags latched during a frame (write-one-to-clear).
    Error,
    /// Interrupt enables for status-1 and error events.
    IntEn1,
    /// Interrupt enables for FIFO level events.
    IntEn2,
    /// Optimal bit time, low byte.
    BitTimeLsb,
    /// Optimal bit time, high byte.
    BitTimeMsb,
}

bitflags! {
    /// Control register.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Control: u8 {
        /// Power down the PECI interface.
        const PD = 1 << 0;
        /// Hold the whole controller in reset.
        const RST = 1 << 3;
        /// Reset the internal write and read FIFOs.
        const FRST = 1 << 5;
        /// Start transmitting the content of the write FIFO.
        const TXEN = 1 << 6;
        /// Master interrupt enable.
        const MIEN = 1 << 7;
    }
}

bitflags! {
    /// Status register 1 (write-one-to-clear).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Status1: u8 {
        /// Beginning of frame.
        const BOF = 1 << 0;
        /// End of frame.
        const EOF = 1 << 1;
        /// An error was latched in the error register.
        const ERR = 1 << 2;
        /// Controller ready.
        const RDY = 1 << 3;
        /// Ready went low.
        const RDYLO = 1 << 4;
        /// Ready went high.
        const RDYHI = 1 << 5;
        /// Master interrupt pending.
        const MINT = 1 << 7;
    }
}

bitflags! {
    /// Status register 2 (read-only).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Status2: u8 {
        /// Write FIFO full.
        const WFF = 1 << 0;
        /// Write FIFO empty.
        const WFE = 1 << 1;
        /// Read FIFO full.
        const RFF = 1 << 2;
        /// Read FIFO empty.
        const RFE = 1 << 3;
        /// No activity on the wire.
        const IDLE = 1 << 7;
    }
}

bitflags! {
    /// Error register (write-one-to-clear).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ErrorFlags: u8 {
        /// Framing error.
        const FERR = 1 << 0;
        /// Bus error.
        const BERR = 1 << 1;
        /// Read buffer overrun: data left in the read FIFO.
        const RDOV = 1 << 3;
        /// Write buffer underrun: data left in the write FIFO.
        const WRUN = 1 << 4;
        /// Clock error.
        const CLKERR = 1 << 7;
    }
}

bitflags! {
    /// Interrupt enable register 1.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct IntEn1: u8 {
        /// Beginning-of-frame interrupt.
        const BIEN = 1 << 0;
        /// Done (end-of-frame) interrupt.
        const DIEN = 1 << 1;
        /// Error interrupt.
        const EIEN = 1 << 2;
        /// Error reporting enable.
        const EREN = 1 << 3;
    }
}

bitflags! {
    /// Interrupt enable register 2.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct IntEn2: u8 {
        /// Write FIFO empty interrupt.
        const ENWFE = 1 << 1;
        /// Read FIFO full interrupt.
        const ENRFF = 1 << 2;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ErrorFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ErrorFlags({=u8:#x})", self.bits())
    }
}

/// Mask applied to the high byte of the bit-time divisor.
pub const BIT_TIME_MSB_MASK: u8 = 0xFF;
/// Offset of the high byte inside the 16-bit bit-time divisor.
pub const BIT_TIME_MSB_SHIFT: u32 = 8;

//==================================================================================REGISTER_ACCESS
/// Byte-wide access to the controller registers.
///
/// Accesses take `&self`, mirroring volatile MMIO: the engine and the
/// interrupt handler may share one register block. Implementations must not
/// cache values, every `read` observes the hardware state.
pub trait PeciRegisters {
    /// Read the raw value of `reg`.
    fn read(&self, reg: Register) -> u8;
    /// Write `value` to `reg`.
    fn write(&self, reg: Register, value: u8);

    /// Read-modify-write setting `bits`.
    fn set_bits(&self, reg: Register, bits: u8) {
        let value = self.read(reg);
        self.write(reg, value | bits);
    }

    /// Read-modify-write clearing `bits`.
    fn clear_bits(&self, reg: Register, bits: u8) {
        let value = self.read(reg);
        self.write(reg, value & !bits);
    }

    fn control(&self) -> Control {
        Control::from_bits_retain(self.read(Register::Control))
    }

    fn status1(&self) -> Status1 {
        Status1::from_bits_retain(self.read(Register::Status1))
    }

    fn status2(&self) -> Status2 {
        Status2::from_bits_retain(self.read(Register::Status2))
    }

    fn error(&self) -> ErrorFlags {
        ErrorFlags::from_bits_retain(self.read(Register::Error))
    }
}

impl<T: PeciRegisters + ?Sized> PeciRegisters for &T {
    fn read(&self, reg: Register) -> u8 {
        (**self).read(reg)
    }

    fn write(&self, reg: Register, value: u8) {
        (**self).write(reg, value)
    }
}

/// Human readable causes for each bit set in `flags`.
///
/// Classification is diagnostic only; recovery never branches on it.
pub fn classify(flags: ErrorFlags) -> impl Iterator<Item = &'static str> {
    flags.iter().map(|flag| {
        if flag == ErrorFlags::RDOV {
            "Read buffer is not empty"
        } else if flag == ErrorFlags::WRUN {
            "Write buffer is not empty"
        } else if flag == ErrorFlags::BERR {
            "PECI bus error"
        } else if flag == ErrorFlags::FERR {
            "PECI framing error"
        } else if flag == ErrorFlags::CLKERR {
            "PECI clock error"
        } else {
            "Unknown PECI error"
        }
    })
}
