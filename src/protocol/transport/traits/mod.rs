//! Abstraction traits used by the engine (delays, interrupt line, bus contract).
pub mod interrupt_line;
pub mod peci_bus;
pub mod peci_delay;
