#![forbid(unsafe_code)]

pub mod clock;

pub mod acpi;
pub mod irq;

pub use acpi::{AcpiDevice, AcpiProfile, SharedAcpiDevice};
