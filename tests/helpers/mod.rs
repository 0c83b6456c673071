/// Test doubles to simulate the PECI controller, delays and interrupt line
/// during integration tests.
use peci_bus::infra::registers::{
    Control, ErrorFlags, PeciRegisters, Register, Status1, Status2,
};
use peci_bus::protocol::transport::traits::{
    interrupt_line::InterruptLine, peci_delay::PeciDelay,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::time::{sleep, Duration};

#[allow(dead_code)]
pub const DEFAULT_FIFO_CAPACITY: usize = 32;

#[derive(Debug)]
struct SimState {
    control: u8,
    status1: u8,
    error: u8,
    int_en1: u8,
    int_en2: u8,
    bit_time: (u8, u8),
    write_fifo: Vec<u8>,
    read_fifo: VecDeque<u8>,
    fifo_capacity: usize,
    idle: bool,
    force_wff: bool,
    stuck_frames: u32,
    response: Vec<u8>,
    error_on_complete: u8,
    frames: Vec<Vec<u8>>,
    writes: Vec<(Register, u8)>,
    read_data_reads: usize,
    full_resets: u32,
    fifo_resets: u32,
}

/// In-memory PECI controller reproducing the register semantics the engine
/// relies on:
///
/// * STATUS1 and ERROR are write-one-to-clear;
/// * bytes written past the FIFO capacity are dropped;
/// * a TXEN rising edge sends the write FIFO as one frame, raises EOF and
///   loads the scripted response into the read FIFO;
/// * an FRST rising edge flushes both FIFOs, an RST rising edge resets the
///   whole block.
#[derive(Debug)]
#[allow(dead_code)]
pub struct SimController {
    state: RefCell<SimState>,
}

#[allow(dead_code)]
impl SimController {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(SimState {
                control: 0,
                status1: 0,
                error: 0,
                int_en1: 0,
                int_en2: 0,
                bit_time: (0, 0),
                write_fifo: Vec::new(),
                read_fifo: VecDeque::new(),
                fifo_capacity: DEFAULT_FIFO_CAPACITY,
                idle: true,
                force_wff: false,
                stuck_frames: 0,
                response: Vec::new(),
                error_on_complete: 0,
                frames: Vec::new(),
                writes: Vec::new(),
                read_data_reads: 0,
                full_resets: 0,
                fifo_resets: 0,
            }),
        }
    }

    /// Bytes loaded into the read FIFO after every frame: write FCS, response,
    /// read FCS.
    pub fn set_response(&self, bytes: &[u8]) {
        self.state.borrow_mut().response = bytes.to_vec();
    }

    /// The next `frames` frames never reach end-of-frame.
    pub fn stick_eof(&self, frames: u32) {
        self.state.borrow_mut().stuck_frames = frames;
    }

    /// Latch `raw` in the error register when the next frame completes.
    pub fn latch_error_on_complete(&self, raw: u8) {
        self.state.borrow_mut().error_on_complete = raw;
    }

    /// Latch `raw` in the error register right away.
    pub fn latch_error(&self, raw: u8) {
        self.state.borrow_mut().error |= raw;
    }

    pub fn set_idle(&self, idle: bool) {
        self.state.borrow_mut().idle = idle;
    }

    pub fn force_write_fifo_full(&self, full: bool) {
        self.state.borrow_mut().force_wff = full;
    }

    pub fn set_fifo_capacity(&self, capacity: usize) {
        self.state.borrow_mut().fifo_capacity = capacity;
    }

    /// Frames put on the wire, header included.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.state.borrow().frames.clone()
    }

    /// Every register write, in order.
    pub fn writes(&self) -> Vec<(Register, u8)> {
        self.state.borrow().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }

    /// Writes performed on `reg`.
    pub fn writes_to(&self, reg: Register) -> Vec<u8> {
        self.state
            .borrow()
            .writes
            .iter()
            .filter(|(r, _)| *r == reg)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn control(&self) -> Control {
        Control::from_bits_retain(self.state.borrow().control)
    }

    pub fn error_bits(&self) -> u8 {
        self.state.borrow().error
    }

    pub fn status1(&self) -> Status1 {
        Status1::from_bits_retain(self.state.borrow().status1)
    }

    pub fn bit_time(&self) -> (u8, u8) {
        self.state.borrow().bit_time
    }

    pub fn int_enables(&self) -> (u8, u8) {
        let state = self.state.borrow();
        (state.int_en1, state.int_en2)
    }

    pub fn pending_read_bytes(&self) -> usize {
        self.state.borrow().read_fifo.len()
    }

    pub fn read_data_reads(&self) -> usize {
        self.state.borrow().read_data_reads
    }

    pub fn full_resets(&self) -> u32 {
        self.state.borrow().full_resets
    }

    pub fn fifo_resets(&self) -> u32 {
        self.state.borrow().fifo_resets
    }

    fn write_control(state: &mut SimState, value: u8) {
        let previous = Control::from_bits_retain(state.control);
        let mut next = Control::from_bits_retain(value);

        if next.contains(Control::RST) && !previous.contains(Control::RST) {
            state.full_resets += 1;
            state.write_fifo.clear();
            state.read_fifo.clear();
            state.status1 = 0;
            state.error = 0;
            state.int_en1 = 0;
            state.int_en2 = 0;
            state.bit_time = (0, 0);
        }

        if next.contains(Control::FRST) && !previous.contains(Control::FRST) {
            state.fifo_resets += 1;
            state.write_fifo.clear();
            state.read_fifo.clear();
            next.remove(Control::TXEN);
        }

        if next.contains(Control::TXEN) && !previous.contains(Control::TXEN) {
            if state.stuck_frames > 0 {
                state.stuck_frames -= 1;
            } else {
                let frame = std::mem::take(&mut state.write_fifo);
                state.frames.push(frame);
                state.status1 |= Status1::EOF.bits();
                let response = state.response.clone();
                state.read_fifo.extend(response);
                state.error |= std::mem::take(&mut state.error_on_complete);
                next.remove(Control::TXEN);
            }
        }

        state.control = next.bits();
    }

    fn status2(state: &SimState) -> Status2 {
        let mut status = Status2::empty();
        if state.force_wff || state.write_fifo.len() >= state.fifo_capacity {
            status |= Status2::WFF;
        }
        if state.write_fifo.is_empty() {
            status |= Status2::WFE;
        }
        if state.read_fifo.len() >= state.fifo_capacity {
            status |= Status2::RFF;
        }
        if state.read_fifo.is_empty() {
            status |= Status2::RFE;
        }
        if state.idle {
            status |= Status2::IDLE;
        }
        status
    }
}

impl PeciRegisters for SimController {
    fn read(&self, reg: Register) -> u8 {
        let mut state = self.state.borrow_mut();
        match reg {
            Register::Control => state.control,
            Register::Status1 => state.status1,
            Register::Status2 => Self::status2(&state).bits(),
            Register::Error => state.error,
            Register::IntEn1 => state.int_en1,
            Register::IntEn2 => state.int_en2,
            Register::BitTimeLsb => state.bit_time.0,
            Register::BitTimeMsb => state.bit_time.1,
            Register::ReadData => {
                state.read_data_reads += 1;
                state.read_fifo.pop_front().unwrap_or(0)
            }
            Register::WriteData => 0,
        }
    }

    fn write(&self, reg: Register, value: u8) {
        let mut state = self.state.borrow_mut();
        state.writes.push((reg, value));
        match reg {
            Register::Control => Self::write_control(&mut state, value),
            Register::Status1 => state.status1 &= !value,
            Register::Error => state.error &= !value,
            Register::IntEn1 => state.int_en1 = value,
            Register::IntEn2 => state.int_en2 = value,
            Register::BitTimeLsb => state.bit_time.0 = value,
            Register::BitTimeMsb => state.bit_time.1 = value,
            Register::WriteData => {
                if state.write_fifo.len() < state.fifo_capacity {
                    state.write_fifo.push(value);
                }
            }
            Register::Status2 | Register::ReadData => {}
        }
    }
}

#[derive(Clone, Default)]
#[allow(dead_code)]
/// Delay provider: busy-waits are only accounted, sleeps use `tokio::time::sleep`.
pub struct MockDelay {
    busy_us: Rc<Cell<u64>>,
    slept_ms: Rc<Cell<u64>>,
    in_interrupt: bool,
}

#[allow(dead_code)]
impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend every call comes from interrupt context.
    pub fn in_interrupt_context() -> Self {
        Self {
            in_interrupt: true,
            ..Self::default()
        }
    }

    /// Total busy-wait time requested so far (µs).
    pub fn busy_us(&self) -> u64 {
        self.busy_us.get()
    }

    /// Total sleep time requested so far (ms).
    pub fn slept_ms(&self) -> u64 {
        self.slept_ms.get()
    }
}

impl PeciDelay for MockDelay {
    fn delay_us(&mut self, micros: u32) {
        self.busy_us.set(self.busy_us.get() + u64::from(micros));
    }

    async fn delay_ms(&mut self, millis: u32) {
        self.slept_ms.set(self.slept_ms.get() + u64::from(millis));
        sleep(Duration::from_millis(millis as u64)).await;
    }

    fn in_interrupt(&self) -> bool {
        self.in_interrupt
    }
}

#[derive(Default)]
#[allow(dead_code)]
/// Interrupt line recording mask state and acknowledgements.
pub struct MockIrq {
    enabled: Cell<bool>,
    cleared: Cell<u32>,
}

#[allow(dead_code)]
impl MockIrq {
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn cleared(&self) -> u32 {
        self.cleared.get()
    }
}

impl InterruptLine for MockIrq {
    fn clear_pending(&self) {
        self.cleared.set(self.cleared.get() + 1);
    }

    fn enable(&self) {
        self.enabled.set(true);
    }

    fn disable(&self) {
        self.enabled.set(false);
    }
}

#[allow(dead_code)]
/// Error bits used by several scenarios.
pub fn bus_and_overrun() -> ErrorFlags {
    ErrorFlags::BERR | ErrorFlags::RDOV
}
