use quartz_devices::acpi::{AcpiCallbacks, AcpiDevice, AcpiProfile};
use quartz_devices::clock::ManualClock;
use quartz_devices::irq::SmiLine;
use std::cell::Cell;
use std::rc::Rc;

struct CountingSmi(Rc<Cell<u32>>);

impl SmiLine for CountingSmi {
    fn raise(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

fn device_with_smi(profile: AcpiProfile) -> (AcpiDevice<ManualClock>, Rc<Cell<u32>>) {
    let count = Rc::new(Cell::new(0));
    let callbacks = AcpiCallbacks {
        smi: Box::new(CountingSmi(count.clone())),
        ..AcpiCallbacks::new()
    };
    let dev = AcpiDevice::new(profile, callbacks, ManualClock::new());
    (dev, count)
}

#[test]
fn smi_is_gated_on_global_enable() {
    let (mut dev, count) = device_with_smi(AcpiProfile::Smc);
    dev.raise_smi(true);
    assert_eq!(count.get(), 0);

    dev.regs_mut().glbctl |= 0x01;
    dev.raise_smi(true);
    assert_eq!(count.get(), 1);
}

#[test]
fn via_smi_lock_holds_off_new_smis_until_release() {
    let (mut dev, count) = device_with_smi(AcpiProfile::Via);

    // SMI command port generates an SMI when enabled.
    dev.write(0x2c, 1, 0x01);
    dev.write(0x2a, 1, 0x40);
    dev.write(0x2f, 1, 0xaa);
    assert_eq!(count.get(), 1);
    assert_eq!(dev.read(0x2c, 1) & 0x01, 0x01);

    // With the lock set, an active SMI blocks further ones.
    dev.write(0x2c, 1, 0x11);
    dev.write(0x2f, 1, 0xbb);
    assert_eq!(count.get(), 1);

    // Releasing the active latch lets the next one through.
    dev.write(0x2d, 1, 0x01);
    dev.write(0x2f, 1, 0xcc);
    assert_eq!(count.get(), 2);
    assert_eq!(dev.regs().smicmd, 0xcc);
}

#[test]
fn intel_smi_consumes_pending_request_bit() {
    let (mut dev, count) = device_with_smi(AcpiProfile::Intel);

    dev.write(0x28, 1, 0x01);
    dev.write(0x2a, 1, 0x01); // bit 16
    assert_eq!(dev.regs().glbctl, 0x0001_0001);

    dev.apm_command_written(true);
    assert_eq!(count.get(), 1);
    assert_eq!(dev.regs().glbctl, 0x0000_0001);
    assert_ne!(dev.regs().glbsts & 0x20, 0);
}

#[test]
fn ali_apm_command_latches_soft_smi() {
    let (mut dev, count) = device_with_smi(AcpiProfile::Ali);

    dev.apm_command_written(true);
    assert_eq!(count.get(), 1);
    assert!(dev.regs().ali_soft_smi);

    // The latch is set even when SMI generation is disabled.
    dev.soft_smi_status_write(false);
    dev.apm_command_written(false);
    assert_eq!(count.get(), 1);
    assert!(dev.regs().ali_soft_smi);
}

#[test]
fn ali_soft_smi_status_read_forces_latch() {
    let (mut dev, _) = device_with_smi(AcpiProfile::Ali);

    dev.soft_smi_status_write(false);
    assert!(!dev.regs().ali_soft_smi);
    assert_eq!(dev.soft_smi_status_read(), 1);
    assert!(dev.regs().ali_soft_smi);
}

#[test]
fn ich2_apm_command_is_gated_on_smi_en() {
    let (mut dev, count) = device_with_smi(AcpiProfile::IntelIch2);

    // APMC_EN without GBL_SMI_EN: status latches but no SMI fires.
    dev.write(0x30, 1, 0x20);
    dev.apm_command_written(true);
    assert_eq!(count.get(), 0);
    assert_ne!(dev.regs().smi_sts & 0x20, 0);

    dev.write(0x30, 1, 0x21);
    dev.apm_command_written(true);
    assert_eq!(count.get(), 1);
}

#[test]
fn ich2_smi_en_write_drives_apm_shim_enable() {
    let shim = Rc::new(Cell::new(false));
    let shim_in_cb = shim.clone();
    let callbacks = AcpiCallbacks {
        apm_set_do_smi: Some(Box::new(move |do_smi| shim_in_cb.set(do_smi))),
        ..AcpiCallbacks::new()
    };
    let mut dev = AcpiDevice::new(AcpiProfile::IntelIch2, callbacks, ManualClock::new());

    dev.write(0x30, 1, 0x20);
    assert!(shim.get());
    dev.write(0x30, 1, 0x00);
    assert!(!shim.get());
}

#[test]
fn smc_gbl_rls_raises_smi_when_bios_enabled() {
    let (mut dev, count) = device_with_smi(AcpiProfile::Smc);

    dev.write_aux(0x07, 1, 0x01); // global SMI enable (also sets GBL_STS)
    dev.write_aux(0x06, 1, 0x01); // BIOS enable
    dev.write(0x04, 1, 0x04); // GBL_RLS
    assert_eq!(count.get(), 1);
    assert_ne!(dev.regs().glbsts & 0x01, 0);
}
