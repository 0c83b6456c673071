//! Interrupt controller collaborator for event-driven operation.
//!
//! Registering the handler on the IRQ vector is platform wiring; the engine
//! only needs to mask, unmask and acknowledge the controller's source.

/// The controller's interrupt source in the platform interrupt aggregator.
pub trait InterruptLine {
    /// Acknowledge a latched source so it does not fire again.
    fn clear_pending(&self);
    /// Route the source to the CPU.
    fn enable(&self);
    /// Stop routing the source to the CPU.
    fn disable(&self);
}
