//! Contracts the ACPI controller consumes from the rest of the machine.
//!
//! The controller never owns the CPU, the buses or the platform; it drives
//! them through these narrow traits. Every trait has a disconnected default
//! so a device can be constructed stand-alone (and tests can substitute
//! recording implementations).

use std::cell::Cell;
use std::rc::Rc;

use crate::irq::{IrqController, NoIrqController, NoSmi, SmiLine};

/// Platform-level power primitives.
pub trait PlatformControl {
    /// Soft power-off. Terminal for the emulated session.
    fn power_off(&mut self);

    /// Cooperative pause signal to the host scheduler.
    fn pause(&mut self, paused: bool);
}

/// CPU-side effects of sleep transitions.
pub trait CpuControl {
    /// Full CPU reset.
    fn request_reset(&mut self);

    /// Select or clear the alternate (address-wrap) reset mode.
    fn set_alternate_reset_mode(&mut self, enabled: bool);

    /// Flush instruction/data translation caches.
    fn flush_caches(&mut self);

    /// Whether the CPU is currently executing in system management mode.
    fn in_smm(&self) -> bool;
}

/// Bus- and board-level reset effects of sleep transitions.
pub trait BusControl {
    /// Reset every PCI-attached device model.
    fn reset_all_pci_devices(&mut self);

    /// Reset the PCI bus itself.
    fn reset_pci_bus(&mut self);

    /// Reset the keyboard controller.
    fn reset_keyboard_controller(&mut self);

    /// Set or clear the chipset's alternate A20 override. Clearing it
    /// returns the A20 line to its default enabled state.
    fn set_a20_alt(&mut self, enabled: bool);
}

/// Byte-addressed non-volatile storage (CMOS/NVRAM).
pub trait NvramWriter {
    fn write_byte(&mut self, reg: u16, value: u8);
}

/// Two-wire (SMBus) GPIO controller owned by the VIA profile.
pub trait SmbusGpio {
    fn set_lines(&mut self, scl: bool, sda: bool);
    fn scl(&self) -> bool;
    fn sda(&self) -> bool;
}

/// Watchdog/timeout co-processor register window (ICH2 TCO block).
pub trait WatchdogRegs {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlatformControl;

impl PlatformControl for NoPlatformControl {
    fn power_off(&mut self) {}
    fn pause(&mut self, _paused: bool) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoCpuControl;

impl CpuControl for NoCpuControl {
    fn request_reset(&mut self) {}
    fn set_alternate_reset_mode(&mut self, _enabled: bool) {}
    fn flush_caches(&mut self) {}
    fn in_smm(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoBusControl;

impl BusControl for NoBusControl {
    fn reset_all_pci_devices(&mut self) {}
    fn reset_pci_bus(&mut self) {}
    fn reset_keyboard_controller(&mut self) {}
    fn set_a20_alt(&mut self, _enabled: bool) {}
}

/// RTC alarm status shared with the RTC device.
///
/// The RTC is the single writer (it sets the flag when its alarm fires); the
/// ACPI controller only mirrors it into PMSTS bit 10 and clears it on the
/// corresponding write-1-to-clear.
pub type SharedRtcStatus = Rc<Cell<bool>>;

/// Host wiring for an [`super::AcpiDevice`].
pub struct AcpiCallbacks {
    pub irq: Box<dyn IrqController>,
    pub smi: Box<dyn SmiLine>,
    pub platform: Box<dyn PlatformControl>,
    pub cpu: Box<dyn CpuControl>,
    pub bus: Box<dyn BusControl>,
    pub nvram: Option<Box<dyn NvramWriter>>,
    /// Forwarded to the APM shim when the ICH2 SMI_EN APMC enable changes.
    pub apm_set_do_smi: Option<Box<dyn FnMut(bool)>>,
}

impl AcpiCallbacks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for AcpiCallbacks {
    fn default() -> Self {
        Self {
            irq: Box::new(NoIrqController),
            smi: Box::new(NoSmi),
            platform: Box::new(NoPlatformControl),
            cpu: Box::new(NoCpuControl),
            bus: Box::new(NoBusControl),
            nvram: None,
            apm_set_do_smi: None,
        }
    }
}
