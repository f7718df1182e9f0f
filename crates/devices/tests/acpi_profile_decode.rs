use quartz_devices::acpi::regs::{PMEN_VALID_MASK, WAK_STS};
use quartz_devices::acpi::{AcpiCallbacks, AcpiDevice, AcpiProfile};
use quartz_devices::clock::ManualClock;

fn device(profile: AcpiProfile) -> AcpiDevice<ManualClock> {
    AcpiDevice::new(profile, AcpiCallbacks::new(), ManualClock::new())
}

#[test]
fn pmen_writes_are_masked_to_valid_bits() {
    for profile in [
        AcpiProfile::Ali,
        AcpiProfile::Via,
        AcpiProfile::Via596b,
        AcpiProfile::Intel,
        AcpiProfile::IntelIch2,
        AcpiProfile::Smc,
    ] {
        let mut dev = device(profile);
        dev.write(0x02, 2, 0xffff);
        assert_eq!(dev.regs().pmen, PMEN_VALID_MASK, "profile {profile:?}");
        assert_eq!(dev.read(0x02, 2), u32::from(PMEN_VALID_MASK));
    }
}

#[test]
fn pmsts_is_write_one_to_clear() {
    let mut dev = device(AcpiProfile::Intel);
    assert_eq!(dev.regs().pmsts, WAK_STS);

    // Writing zeros must leave pending bits alone.
    dev.write(0x00, 2, 0x0000);
    assert_eq!(dev.regs().pmsts, WAK_STS);

    dev.write(0x00, 2, 0xffff);
    assert_eq!(dev.regs().pmsts, 0x0000);
}

#[test]
fn pmcntrl_sleep_enable_reads_back_clear() {
    let mut dev = device(AcpiProfile::Smc);
    // SLP_EN with an all-zero sleep table is a no-op on this profile, but
    // the write must still merge under the valid mask with bit 13 hidden.
    dev.write(0x05, 1, 0xff);
    assert_eq!(dev.regs().pmcntrl & 0xff00, 0x3f00);
    assert_eq!(dev.read(0x05, 1), 0x1f);
}

#[test]
fn via_window_aliases_common_block() {
    let clock = ManualClock::new();
    clock.set(0x123456);
    let mut dev = AcpiDevice::new(AcpiProfile::Via, AcpiCallbacks::new(), clock);

    // The VIA window is 0x100 ports wide; offsets with no decode entry fall
    // through to the common block under its own 0x3f mask.
    assert_eq!(dev.read(0x88, 4), dev.read(0x08, 4));
    assert_eq!(dev.read(0x08, 4), 0x123456);
}

#[test]
fn intel_gpi_registers_decode_byte_cycles_only() {
    let mut dev = device(AcpiProfile::Intel);
    assert_eq!(dev.read(0x30, 1), 0xff);
    assert_eq!(dev.read(0x31, 1), 0xff);
    // Word and dword cycles read as zero rather than reaching the latch.
    assert_eq!(dev.read(0x30, 2), 0x0000);
}

#[test]
fn ich2_gpe1_enable_merges_over_gpe0_enable() {
    let mut dev = device(AcpiProfile::IntelIch2);
    dev.write(0x2a, 1, 0xff);
    assert_eq!(dev.regs().gpen, 0x007d);

    // The GPE1 enable write folds the other byte in from the GPE0 enable
    // register, matching the silicon's (mis)wiring.
    dev.write(0x2f, 1, 0xff);
    assert_eq!(dev.regs().gpen1, 0x097d);
}

#[test]
fn ali_gpe1_enable_merges_over_gpe0_enable() {
    let mut dev = device(AcpiProfile::Ali);
    dev.write(0x1a, 1, 0xff);
    assert_eq!(dev.regs().gpen, 0x0007);

    dev.write(0x1f, 1, 0xff);
    assert_eq!(dev.regs().gpen1, 0x0c01);
}

#[test]
fn reset_restores_power_on_defaults() {
    let mut dev = device(AcpiProfile::Via596b);
    dev.write(0x02, 2, 0xffff);
    dev.write(0x4c, 4, 0x1234_5678);
    dev.reset();

    assert_eq!(dev.regs().pmen, 0x0000);
    assert_eq!(dev.regs().pmsts, WAK_STS);
    assert_eq!(dev.regs().gpo_val, 0x7fff_ffff);
    assert_eq!(dev.regs().gpi_val, 0xfff5_7fc1);
}
