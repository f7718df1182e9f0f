//! Interrupt wiring contracts for chipset devices.
//!
//! South-bridge functions can deliver their interrupt three different ways
//! depending on how the board routes them: through their own PCI INTx pin,
//! through a shared chipset-internal line, or through a steerable legacy ISA
//! IRQ. The SMI line is separate: it is a pulse into the CPU's system
//! management logic, not a level that is held.

/// Sink for the interrupt delivery modes a south-bridge device can use.
pub trait IrqController {
    /// Drive the INTx pin of PCI slot `slot`.
    fn set_pci_intx(&mut self, slot: u8, pin: u8, asserted: bool);

    /// Drive a shared chipset-internal line. `level_triggered` describes the
    /// line's trigger mode to the router, it is not the line state.
    fn set_shared_line(&mut self, line: u8, level_triggered: bool, asserted: bool);

    /// Drive a routed legacy ISA IRQ.
    fn set_isa_irq(&mut self, irq: u8, asserted: bool);
}

/// Disconnected interrupt sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIrqController;

impl IrqController for NoIrqController {
    fn set_pci_intx(&mut self, _slot: u8, _pin: u8, _asserted: bool) {}
    fn set_shared_line(&mut self, _line: u8, _level_triggered: bool, _asserted: bool) {}
    fn set_isa_irq(&mut self, _irq: u8, _asserted: bool) {}
}

/// The System Management Interrupt line.
pub trait SmiLine {
    /// Pulse SMI into the CPU.
    fn raise(&mut self);
}

/// Disconnected SMI line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSmi;

impl SmiLine for NoSmi {
    fn raise(&mut self) {}
}
