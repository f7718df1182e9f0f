use quartz_devices::acpi::{
    update_aux_io_mapping, update_io_mapping, AcpiCallbacks, AcpiDevice, AcpiProfile,
    SharedAcpiDevice,
};
use quartz_devices::clock::ManualClock;
use quartz_platform::io::IoPortBus;
use std::cell::RefCell;
use std::rc::Rc;

fn shared_device(profile: AcpiProfile, clock: ManualClock) -> SharedAcpiDevice<ManualClock> {
    Rc::new(RefCell::new(AcpiDevice::new(
        profile,
        AcpiCallbacks::new(),
        clock,
    )))
}

#[test]
fn window_maps_and_relocates() {
    let clock = ManualClock::new();
    clock.set(0x1234);
    let dev = shared_device(AcpiProfile::Intel, clock);
    let mut bus = IoPortBus::new();

    update_io_mapping(&mut bus, &dev, 0x800, true);
    assert!(bus.has_range(0x800, 0x40));
    assert_eq!(bus.read(0x808, 4), 0x1234);

    // Relocation tears the old window down first.
    update_io_mapping(&mut bus, &dev, 0x900, true);
    assert!(!bus.has_range(0x800, 0x40));
    assert_eq!(bus.read(0x808, 4), 0xffff_ffff);
    assert_eq!(bus.read(0x908, 4), 0x1234);
}

#[test]
fn remap_to_same_base_is_idempotent() {
    let dev = shared_device(AcpiProfile::Via, ManualClock::new());
    let mut bus = IoPortBus::new();

    update_io_mapping(&mut bus, &dev, 0x400, true);
    update_io_mapping(&mut bus, &dev, 0x400, true);
    assert!(bus.has_range(0x400, 0x100));
    assert_eq!(bus.read(0x408, 4), 0x0000);
}

#[test]
fn chipset_disable_unmaps_window() {
    let dev = shared_device(AcpiProfile::IntelIch2, ManualClock::new());
    let mut bus = IoPortBus::new();

    update_io_mapping(&mut bus, &dev, 0x800, true);
    update_io_mapping(&mut bus, &dev, 0x800, false);
    assert!(!bus.has_range(0x800, 0x80));
    assert_eq!(bus.read(0x808, 1), 0xff);

    // Re-enabling at the same base works even though the window was down.
    update_io_mapping(&mut bus, &dev, 0x800, true);
    assert!(bus.has_range(0x800, 0x80));
}

#[test]
fn zero_base_never_maps() {
    let dev = shared_device(AcpiProfile::Intel, ManualClock::new());
    let mut bus = IoPortBus::new();

    update_io_mapping(&mut bus, &dev, 0, true);
    assert!(!bus.has_range(0, 0x40));
}

#[test]
fn smc_aux_window_decodes_and_writes() {
    let dev = shared_device(AcpiProfile::Smc, ManualClock::new());
    let mut bus = IoPortBus::new();

    update_aux_io_mapping(&mut bus, &dev, 0x850, true);
    assert!(bus.has_range(0x850, 0x08));

    bus.write(0x856, 1, 0x03);
    assert_eq!(dev.borrow().regs().glben, 0x0003);
    assert_eq!(bus.read(0x856, 1), 0x03);
}

#[test]
fn aux_window_is_absent_on_profiles_without_one() {
    let dev = shared_device(AcpiProfile::Via, ManualClock::new());
    let mut bus = IoPortBus::new();

    // The mapping call only tracks the base; no range appears on the bus.
    update_aux_io_mapping(&mut bus, &dev, 0x850, true);
    assert!(!bus.has_range(0x850, 0x00));
    assert_eq!(bus.read(0x850, 1), 0xff);

    // The device-level auxiliary decode floats high too.
    assert_eq!(dev.borrow_mut().read_aux(0x00, 1), 0xff);
    assert_eq!(dev.borrow_mut().read_aux(0x00, 4), 0xffff_ffff);
}

#[test]
fn bus_reset_propagates_to_device() {
    let dev = shared_device(AcpiProfile::Intel, ManualClock::new());
    let mut bus = IoPortBus::new();

    update_io_mapping(&mut bus, &dev, 0x800, true);
    bus.write(0x802, 2, 0x0521);
    assert_eq!(dev.borrow().regs().pmen, 0x0521);

    bus.reset();
    assert_eq!(dev.borrow().regs().pmen, 0x0000);
}
