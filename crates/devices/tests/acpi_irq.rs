use quartz_devices::acpi::regs::{BM_STS, RTC_EN, RTC_STS, TMROF_EN, TMROF_STS, WAK_STS};
use quartz_devices::acpi::{AcpiCallbacks, AcpiDevice, AcpiProfile, IrqMode, SharedRtcStatus};
use quartz_devices::clock::ManualClock;
use quartz_devices::irq::IrqController;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IrqEvent {
    PciIntx { slot: u8, pin: u8, asserted: bool },
    Shared { line: u8, level: bool, asserted: bool },
    Isa { irq: u8, asserted: bool },
}

#[derive(Clone, Default)]
struct IrqRecorder {
    events: Rc<RefCell<Vec<IrqEvent>>>,
}

impl IrqRecorder {
    fn last(&self) -> Option<IrqEvent> {
        self.events.borrow().last().copied()
    }
}

impl IrqController for IrqRecorder {
    fn set_pci_intx(&mut self, slot: u8, pin: u8, asserted: bool) {
        self.events
            .borrow_mut()
            .push(IrqEvent::PciIntx { slot, pin, asserted });
    }

    fn set_shared_line(&mut self, line: u8, level_triggered: bool, asserted: bool) {
        self.events.borrow_mut().push(IrqEvent::Shared {
            line,
            level: level_triggered,
            asserted,
        });
    }

    fn set_isa_irq(&mut self, irq: u8, asserted: bool) {
        self.events
            .borrow_mut()
            .push(IrqEvent::Isa { irq, asserted });
    }
}

fn device_with_recorder(profile: AcpiProfile) -> (AcpiDevice<ManualClock>, IrqRecorder) {
    let recorder = IrqRecorder::default();
    let callbacks = AcpiCallbacks {
        irq: Box::new(recorder.clone()),
        ..AcpiCallbacks::new()
    };
    let dev = AcpiDevice::new(profile, callbacks, ManualClock::new());
    (dev, recorder)
}

#[test]
fn rtc_event_raises_and_clears_sci() {
    let (mut dev, recorder) = device_with_recorder(AcpiProfile::Intel);
    dev.write(0x00, 2, u32::from(WAK_STS));

    dev.write(0x03, 1, (RTC_EN >> 8) as u32);
    dev.regs_mut().pmsts |= RTC_STS;
    dev.update_irq();
    assert_eq!(
        recorder.last(),
        Some(IrqEvent::Isa {
            irq: 9,
            asserted: true
        })
    );

    // Acknowledging the status bit drops the line.
    dev.write(0x01, 1, (RTC_STS >> 8) as u32);
    assert_eq!(
        recorder.last(),
        Some(IrqEvent::Isa {
            irq: 9,
            asserted: false
        })
    );
}

#[test]
fn rtc_alarm_flag_is_mirrored_and_cleared_through_pmsts() {
    let (mut dev, _) = device_with_recorder(AcpiProfile::Via);
    let rtc: SharedRtcStatus = SharedRtcStatus::default();
    dev.set_rtc_status(rtc.clone());

    rtc.set(true);
    assert_eq!(dev.read(0x01, 1) & 0x04, 0x04);

    // Write-1-to-clear on the mirror position clears the shared flag too.
    dev.write(0x01, 1, 0x04);
    assert!(!rtc.get());
    assert_eq!(dev.read(0x01, 1) & 0x04, 0x00);
}

#[test]
fn pci_pin_delivery_mode() {
    let (mut dev, recorder) = device_with_recorder(AcpiProfile::Intel);
    dev.set_irq_mode(IrqMode::PciPin);
    dev.set_pci_slot(7);
    dev.set_irq_pin(2);

    dev.regs_mut().pmsts |= RTC_STS;
    dev.regs_mut().pmen |= RTC_EN;
    dev.update_irq();
    assert_eq!(
        recorder.last(),
        Some(IrqEvent::PciIntx {
            slot: 7,
            pin: 2,
            asserted: true
        })
    );
}

#[test]
fn ali_uses_shared_line_by_default() {
    let (mut dev, recorder) = device_with_recorder(AcpiProfile::Ali);
    dev.set_shared_line_level(true);

    dev.regs_mut().pmsts |= RTC_STS;
    dev.regs_mut().pmen |= RTC_EN;
    dev.update_irq();
    assert_eq!(
        recorder.last(),
        Some(IrqEvent::Shared {
            line: 5,
            level: true,
            asserted: true
        })
    );
}

#[test]
fn smc_bus_master_status_asserts_sci_without_enable() {
    let (mut dev, recorder) = device_with_recorder(AcpiProfile::Smc);
    dev.write(0x00, 2, u32::from(WAK_STS));

    // BM_STS feeds the SCI directly on this profile; there is no enable bit
    // for it.
    dev.regs_mut().pmsts |= BM_STS;
    dev.update_irq();
    assert_eq!(
        recorder.last(),
        Some(IrqEvent::Isa {
            irq: 9,
            asserted: true
        })
    );
}

#[test]
fn update_irq_is_idempotent() {
    let (mut dev, recorder) = device_with_recorder(AcpiProfile::Intel);
    dev.regs_mut().pmsts |= RTC_STS;
    dev.regs_mut().pmen |= RTC_EN;

    dev.update_irq();
    dev.update_irq();
    let events = recorder.events.borrow();
    let tail: Vec<_> = events.iter().rev().take(2).collect();
    assert!(tail.iter().all(|e| matches!(
        e,
        IrqEvent::Isa {
            irq: 9,
            asserted: true
        }
    )));
}

#[test]
fn update_irq_maintains_overflow_arming() {
    let (mut dev, _) = device_with_recorder(AcpiProfile::Intel);

    dev.regs_mut().pmen |= TMROF_EN;
    dev.update_irq();
    assert!(dev.next_deadline().is_some());

    // A pending unacknowledged overflow disarms the timer.
    dev.regs_mut().pmsts |= TMROF_STS;
    dev.update_irq();
    assert!(dev.next_deadline().is_none());

    dev.regs_mut().pmsts &= !TMROF_STS;
    dev.update_irq();
    assert!(dev.next_deadline().is_some());
}
