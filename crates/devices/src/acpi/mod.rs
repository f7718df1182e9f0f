//! South-bridge ACPI / power-management controller.
//!
//! One device model covers six chipset families ("profiles"): ALi M1535,
//! VIA VT82C586B/596A, VIA VT82C596B, Intel PIIX4, Intel ICH2 and the SMC
//! FDC73C931APM. The profiles share a common low-offset register block
//! (PMSTS/PMEN/PMCNTRL/PMTMR) and diverge above it; each profile's decode
//! table intercepts what it needs and falls through to the common block for
//! the rest.
//!
//! Guest-visible behavior is bit-exact per profile: valid-bit masks,
//! write-1-to-clear semantics, SCI/SMI trigger rules and the sleep-state
//! side effects all differ between families and are reproduced as real
//! firmware expects to find them.
//!
//! Timekeeping: the PM timer has no stored counter. Its value is always
//! derived from the reference clock scaled by the configured ratio, and the
//! overflow interrupt is a one-shot deadline the host fires via [`AcpiDevice::poll`].

mod host;
mod profiles;
pub mod regs;

use std::cell::RefCell;
use std::rc::Rc;

use quartz_io_snapshot::{
    IoSnapshot, SnapshotReader, SnapshotResult, SnapshotVersion, SnapshotWriter,
};
use quartz_platform::io::{IoPortBus, PortIoDevice};
use tracing::{debug, trace};

use crate::clock::{Clock, NullClock};
pub use host::{
    AcpiCallbacks, BusControl, CpuControl, NvramWriter, PlatformControl, SharedRtcStatus,
    SmbusGpio, WatchdogRegs,
};
pub use regs::{AcpiProfile, AcpiRegisters, SuspendType};
use regs::{
    ACPI_TIMER_FREQ, BM_STS, GBL_EN, ICH2_SMI_EN_GBL_SMI, ICH2_SMI_EN_SLP, PMCNTRL_SCI_EN,
    PMCNTRL_SLP_EN, PMCNTRL_VALID_MASK, PMEN_VALID_MASK, PMSTS_CLEAR_MASK, PWRBTN_EN, RTC_EN,
    TMROF_EN, TMROF_STS, WAK_STS,
};

/// How the SCI reaches the interrupt controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IrqMode {
    /// Steerable legacy ISA IRQ (the power-on default, routed to IRQ 9).
    #[default]
    LegacyRouted,
    /// The device's own PCI INTx pin.
    PciPin,
    /// Shared chipset-internal line 5 (ALi boards).
    SharedLine,
}

/// Shared chipset-internal line used by [`IrqMode::SharedLine`].
const SHARED_SCI_LINE: u8 = 5;

/// Delay before the resume event fires after a suspend sequence, in
/// emulated microseconds.
const RESUME_DELAY_US: f64 = 50.0;

pub struct AcpiDevice<C: Clock = NullClock> {
    profile: AcpiProfile,
    pub(crate) regs: AcpiRegisters,
    pub(crate) callbacks: AcpiCallbacks,
    clock: C,

    /// Reference-clock rate in Hz; `ticks_to_pm` is the derived
    /// PM-ticks-per-reference-tick ratio.
    ref_hz: f64,
    ticks_to_pm: f64,

    suspend_types: [SuspendType; 8],

    // Interrupt wiring.
    irq_mode: IrqMode,
    slot: u8,
    irq_pin: u8,
    irq_line: u8,
    shared_line_is_level: bool,

    // Power-on defaults configured by the surrounding chipset device.
    gporeg_default: [u8; 4],
    gpireg2_default: u8,
    timer32_default: bool,

    pub(crate) rtc_status: SharedRtcStatus,
    pub(crate) trap_update: Option<Box<dyn FnMut()>>,
    pub(crate) smbus: Option<Box<dyn SmbusGpio>>,
    pub(crate) watchdog: Option<Box<dyn WatchdogRegs>>,

    // I/O window state.
    io_base: u16,
    aux_io_base: u16,

    // One-shot deadlines in reference ticks, fired from `poll`.
    overflow_deadline: Option<u64>,
    resume_deadline: Option<u64>,
}

impl<C: Clock> AcpiDevice<C> {
    pub fn new(profile: AcpiProfile, callbacks: AcpiCallbacks, clock: C) -> Self {
        let mut dev = Self {
            profile,
            regs: AcpiRegisters::default(),
            callbacks,
            clock,
            ref_hz: ACPI_TIMER_FREQ,
            ticks_to_pm: 1.0,
            suspend_types: profile.sleep_types(),
            irq_mode: if profile == AcpiProfile::Ali {
                IrqMode::SharedLine
            } else {
                IrqMode::LegacyRouted
            },
            slot: 0,
            irq_pin: 0,
            irq_line: 9,
            shared_line_is_level: false,
            gporeg_default: [0; 4],
            gpireg2_default: 0,
            timer32_default: false,
            rtc_status: SharedRtcStatus::default(),
            trap_update: None,
            smbus: None,
            watchdog: None,
            io_base: 0,
            aux_io_base: 0,
            overflow_deadline: None,
            resume_deadline: None,
        };
        dev.reset();
        dev
    }

    pub fn profile(&self) -> AcpiProfile {
        self.profile
    }

    pub fn regs(&self) -> &AcpiRegisters {
        &self.regs
    }

    /// Direct register access for the surrounding chipset and board code,
    /// which posts wake/SCI events by setting status bits and then calling
    /// [`Self::update_irq`].
    pub fn regs_mut(&mut self) -> &mut AcpiRegisters {
        &mut self.regs
    }

    // Construction-time wiring, mirroring how chipset devices configure the
    // controller before mapping it.

    pub fn set_timer32(&mut self, timer32: bool) {
        self.timer32_default = timer32;
        self.regs.timer32 = timer32;
    }

    pub fn set_pci_slot(&mut self, slot: u8) {
        self.slot = slot;
    }

    pub fn set_irq_mode(&mut self, irq_mode: IrqMode) {
        self.irq_mode = irq_mode;
    }

    pub fn set_irq_pin(&mut self, irq_pin: u8) {
        self.irq_pin = irq_pin;
    }

    pub fn set_irq_line(&mut self, irq_line: u8) {
        self.irq_line = irq_line;
    }

    pub fn set_shared_line_level(&mut self, is_level: bool) {
        self.shared_line_is_level = is_level;
    }

    pub fn set_gpi2_default(&mut self, value: u8) {
        self.gpireg2_default = value;
        self.regs.gpireg[2] = value;
    }

    pub fn init_gpo_defaults(&mut self, values: [u8; 4]) {
        self.gporeg_default = values;
        self.regs.gporeg = values;
    }

    pub fn set_rtc_status(&mut self, status: SharedRtcStatus) {
        self.rtc_status = status;
    }

    pub fn set_trap_update(&mut self, update: Box<dyn FnMut()>) {
        self.trap_update = Some(update);
    }

    pub fn set_smbus_gpio(&mut self, smbus: Box<dyn SmbusGpio>) {
        self.smbus = Some(smbus);
    }

    pub fn set_watchdog(&mut self, watchdog: Box<dyn WatchdogRegs>) {
        self.watchdog = Some(watchdog);
    }

    /// Reset to power-on state. Power-on always reports a pending resume
    /// event (WAK_STS), and the shared RTC alarm flag is cleared.
    pub fn reset(&mut self) {
        self.regs = AcpiRegisters::at_power_on(
            self.profile,
            self.gpireg2_default,
            self.gporeg_default,
            self.timer32_default,
        );
        self.rtc_status.set(false);
    }

    /// Reference-clock rate change (host speed change): the PM-tick ratio is
    /// recomputed immediately and any pending deadline is rescheduled against
    /// the new ratio, never left stale.
    pub fn set_clock_rate(&mut self, hz: f64) {
        let old_hz = self.ref_hz;
        self.ref_hz = hz;
        self.ticks_to_pm = ACPI_TIMER_FREQ / hz;

        if self.overflow_deadline.is_some() {
            self.rearm_overflow_timer(true);
        }
        if let Some(deadline) = self.resume_deadline {
            let now = self.clock.ticks();
            let remaining = deadline.saturating_sub(now) as f64;
            self.resume_deadline = Some(now + (remaining * hz / old_hz) as u64);
        }
    }

    // PM timer model.

    fn pm_clock(&self) -> u64 {
        (self.clock.ticks() as f64 * self.ticks_to_pm) as u64
    }

    /// Current PM timer value, truncated to the configured width. Always
    /// derived from the reference clock; there is no stored counter.
    pub fn timer_value(&self) -> u32 {
        let clock = self.pm_clock();
        if self.regs.timer32 {
            clock as u32
        } else {
            (clock & 0x00ff_ffff) as u32
        }
    }

    /// Emulated microseconds until the timer's next overflow (the next
    /// power-of-two boundary of the configured width).
    pub fn overflow_period_us(&self) -> f64 {
        let timer = self.pm_clock();
        let overflow_time = if self.regs.timer32 {
            (timer + 0x8000_0000) & !0x7fff_ffff
        } else {
            (timer + 0x0080_0000) & !0x007f_ffff
        };
        ((overflow_time - timer) as f64 / ACPI_TIMER_FREQ) * 1_000_000.0
    }

    fn rearm_overflow_timer(&mut self, enable: bool) {
        if enable {
            let delay = (self.overflow_period_us() * self.ref_hz / 1_000_000.0) as u64;
            self.overflow_deadline = Some(self.clock.ticks() + delay);
        } else {
            self.overflow_deadline = None;
        }
    }

    fn resume_delay_ticks(&self) -> u64 {
        ((RESUME_DELAY_US * self.ref_hz / 1_000_000.0) as u64).max(1)
    }

    /// Earliest pending deadline in reference ticks, if any. Hosts can sleep
    /// until this instant before calling [`Self::poll`].
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.overflow_deadline, self.resume_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire any deadline the reference clock has passed.
    pub fn poll(&mut self) {
        let now = self.clock.ticks();
        if self.overflow_deadline.is_some_and(|d| now >= d) {
            self.overflow_deadline = None;
            self.timer_overflow();
        }
        if self.resume_deadline.is_some_and(|d| now >= d) {
            self.resume_deadline = None;
            self.resume_fired();
        }
    }

    fn timer_overflow(&mut self) {
        let sci_en = self.regs.pmcntrl & PMCNTRL_SCI_EN != 0;

        self.regs.pmsts |= TMROF_STS;

        // Timer Overflow Interrupt Enable.
        if self.regs.pmen & TMROF_EN != 0 {
            debug!(sci_en, "pm timer overflow");
            if sci_en {
                self.update_irq();
            } else {
                self.raise_smi(true);
            }
        }
    }

    fn resume_fired(&mut self) {
        self.regs.pmsts |= WAK_STS;

        // Some firmware SMI traps clear the resume bit before handing back
        // to the OS; while in SMM, keep re-posting the event.
        if self.callbacks.cpu.in_smm() {
            self.resume_deadline = Some(self.clock.ticks() + self.resume_delay_ticks());
        }
    }

    // SCI/SMI routing.

    /// Recompute the SCI line from current status/enable state.
    ///
    /// Postcondition: the overflow timer is rearmed exactly when the
    /// overflow interrupt is enabled and no unacknowledged overflow is
    /// pending, and disarmed otherwise.
    pub fn update_irq(&mut self) {
        let mut sci_level =
            (self.regs.pmsts & self.regs.pmen) & (RTC_EN | PWRBTN_EN | GBL_EN | TMROF_EN);
        if self.profile == AcpiProfile::Smc {
            sci_level |= self.regs.pmsts & BM_STS;
        }

        let asserted = sci_level != 0;
        match self.irq_mode {
            IrqMode::PciPin => {
                self.callbacks
                    .irq
                    .set_pci_intx(self.slot, self.irq_pin, asserted)
            }
            IrqMode::SharedLine => self.callbacks.irq.set_shared_line(
                SHARED_SCI_LINE,
                self.shared_line_is_level,
                asserted,
            ),
            IrqMode::LegacyRouted => self.callbacks.irq.set_isa_irq(self.irq_line, asserted),
        }

        self.rearm_overflow_timer(
            (self.regs.pmen & TMROF_EN != 0) && (self.regs.pmsts & TMROF_STS == 0),
        );
    }

    /// Per-profile SMI arbitration. `do_smi` is false when a caller only
    /// wants the arbitration side effects without pulsing the line.
    pub fn raise_smi(&mut self, do_smi: bool) {
        if self.regs.glbctl & 0x01 != 0 {
            match self.profile {
                AcpiProfile::Via | AcpiProfile::Via596b => {
                    // The lock holds off new SMIs while one is outstanding.
                    if !self.regs.smi_lock || !self.regs.smi_active {
                        if do_smi {
                            trace!("smi raised");
                            self.callbacks.smi.raise();
                        }
                        self.regs.smi_active = true;
                    }
                }
                AcpiProfile::Intel | AcpiProfile::Ali => {
                    if do_smi {
                        trace!("smi raised");
                        self.callbacks.smi.raise();
                    }
                    // Generating the SMI consumes the pending request bit
                    // (Intel) or latches the soft-SMI flag (ALi).
                    if self.profile == AcpiProfile::Intel {
                        self.regs.glbctl &= !0x0001_0000;
                    } else {
                        self.regs.ali_soft_smi = true;
                    }
                }
                AcpiProfile::Smc => {
                    if do_smi {
                        trace!("smi raised");
                        self.callbacks.smi.raise();
                    }
                }
                AcpiProfile::IntelIch2 => {}
            }
        } else if self.profile == AcpiProfile::IntelIch2
            && do_smi
            && self.regs.smi_en & ICH2_SMI_EN_GBL_SMI != 0
        {
            trace!("smi raised");
            self.callbacks.smi.raise();
        }
    }

    /// APM shim notification: the guest wrote the APM command port.
    ///
    /// `do_smi` is the shim's SMI-generation enable. Status side effects are
    /// profile-specific; the ALi latch is set even when the pulse itself is
    /// suppressed.
    pub fn apm_command_written(&mut self, do_smi: bool) {
        match self.profile {
            AcpiProfile::Ali => {
                if do_smi {
                    self.callbacks.smi.raise();
                }
                self.regs.ali_soft_smi = true;
            }
            AcpiProfile::Intel => {
                self.regs.glbsts |= 0x20;
                self.raise_smi(do_smi);
            }
            AcpiProfile::IntelIch2 => {
                if do_smi {
                    self.regs.smi_sts |= 0x0000_0020;
                }
                self.raise_smi(do_smi);
            }
            _ => self.raise_smi(do_smi),
        }
    }

    /// ALi soft-SMI status, as seen through the shim's status port: reading
    /// latches the flag back to set.
    pub fn soft_smi_status_read(&mut self) -> u8 {
        self.regs.ali_soft_smi = true;
        1
    }

    pub fn soft_smi_status_write(&mut self, soft_smi: bool) {
        self.regs.ali_soft_smi = soft_smi;
    }

    // Register access. Multi-byte accesses decompose into byte accesses at
    // ascending offsets; the overall access size is forwarded because a few
    // registers only decode byte-wide cycles.

    pub fn read(&mut self, addr: u16, size: u8) -> u32 {
        let mut ret = 0u32;
        for i in 0..u16::from(size) {
            ret |= u32::from(self.reg_read(size, addr.wrapping_add(i))) << (8 * i);
        }
        trace!(addr, size, ret, "acpi read");
        ret
    }

    pub fn write(&mut self, addr: u16, size: u8, value: u32) {
        trace!(addr, size, value, "acpi write");
        for i in 0..u16::from(size) {
            self.reg_write(size, addr.wrapping_add(i), (value >> (8 * i)) as u8);
        }
    }

    pub fn read_aux(&mut self, addr: u16, size: u8) -> u32 {
        let mut ret = 0u32;
        for i in 0..u16::from(size) {
            ret |= u32::from(self.aux_reg_read(size, addr.wrapping_add(i))) << (8 * i);
        }
        trace!(addr, size, ret, "acpi aux read");
        ret
    }

    pub fn write_aux(&mut self, addr: u16, size: u8, value: u32) {
        trace!(addr, size, value, "acpi aux write");
        for i in 0..u16::from(size) {
            self.aux_reg_write(size, addr.wrapping_add(i), (value >> (8 * i)) as u8);
        }
    }

    fn reg_read(&mut self, size: u8, addr: u16) -> u8 {
        match self.profile {
            AcpiProfile::Ali => self.read_ali(size, addr),
            AcpiProfile::Via => self.read_via(size, addr),
            AcpiProfile::Via596b => self.read_via_596b(size, addr),
            AcpiProfile::Intel => self.read_intel(size, addr),
            AcpiProfile::IntelIch2 => self.read_intel_ich2(size, addr),
            AcpiProfile::Smc => self.read_smc(size, addr),
        }
    }

    fn reg_write(&mut self, size: u8, addr: u16, val: u8) {
        match self.profile {
            AcpiProfile::Ali => self.write_ali(size, addr, val),
            AcpiProfile::Via => self.write_via(size, addr, val),
            AcpiProfile::Via596b => self.write_via_596b(size, addr, val),
            AcpiProfile::Intel => self.write_intel(size, addr, val),
            AcpiProfile::IntelIch2 => self.write_intel_ich2(size, addr, val),
            AcpiProfile::Smc => self.write_smc(size, addr, val),
        }
    }

    fn aux_reg_read(&mut self, size: u8, addr: u16) -> u8 {
        match self.profile {
            AcpiProfile::Smc => self.aux_read_smc(size, addr),
            _ => 0xff,
        }
    }

    fn aux_reg_write(&mut self, size: u8, addr: u16, val: u8) {
        if self.profile == AcpiProfile::Smc {
            self.aux_write_smc(size, addr, val);
        }
    }

    // Common register block, shared by every profile's decode table.

    pub(crate) fn read_common_regs(&mut self, _size: u8, addr: u16) -> u8 {
        let addr = addr & 0x3f;
        let shift16 = (addr & 1) << 3;
        let shift32 = (addr & 3) << 3;

        match addr {
            // PMSTS - Power Management Status Register.
            0x00 | 0x01 => {
                let mut ret = (self.regs.pmsts >> shift16) as u8;
                if addr == 0x01 {
                    ret |= (self.rtc_status.get() as u8) << 2;
                }
                ret
            }
            // PMEN - Power Management Resume Enable Register.
            0x02 | 0x03 => (self.regs.pmen >> shift16) as u8,
            // PMCNTRL - Power Management Control Register.
            0x04 | 0x05 => {
                let ret = (self.regs.pmcntrl >> shift16) as u8;
                if addr == 0x05 {
                    // SLP_EN is write-only.
                    ret & 0xdf
                } else {
                    ret
                }
            }
            // PMTMR - Power Management Timer Register.
            0x08..=0x0b => (self.timer_value() >> shift32) as u8,
            _ => 0x00,
        }
    }

    pub(crate) fn write_common_regs(&mut self, _size: u8, addr: u16, val: u8) {
        let addr = addr & 0x3f;
        let shift16 = (addr & 1) << 3;

        match addr {
            // PMSTS - write-1-to-clear.
            0x00 | 0x01 => {
                self.regs.pmsts &= !((u16::from(val) << shift16) & PMSTS_CLEAR_MASK);
                if addr == 0x01 && val & 0x04 != 0 {
                    self.rtc_status.set(false);
                }
                self.update_irq();
            }
            // PMEN.
            0x02 | 0x03 => {
                self.regs.pmen = ((self.regs.pmen & !(0xff << shift16))
                    | (u16::from(val) << shift16))
                    & PMEN_VALID_MASK;
                self.update_irq();
            }
            // PMCNTRL - sleep control lives in the high byte.
            0x04 | 0x05 => {
                if addr == 0x05
                    && val & PMCNTRL_SLP_EN != 0
                    && val & 0x04 != 0
                    && self.regs.smi_en & ICH2_SMI_EN_SLP != 0
                    && self.profile == AcpiProfile::IntelIch2
                {
                    // ICH2 firmware trap: SLP_SMI_EN converts the sleep
                    // request into an SMI instead of a state transition.
                    self.regs.smi_sts |= 0x0000_0010;
                    self.raise_smi(true);
                } else if addr == 0x05 && val & PMCNTRL_SLP_EN != 0 {
                    let sus_typ = self.suspend_types[usize::from((val >> 2) & 7)];
                    debug!(?sus_typ, "sleep-enable write");

                    if sus_typ.contains(SuspendType::POWER_OFF) {
                        // Soft power off: terminal, no further register state
                        // applies.
                        self.callbacks.platform.power_off();
                        return;
                    }

                    if sus_typ.contains(SuspendType::SUSPEND) {
                        if sus_typ.contains(SuspendType::NVR) {
                            // Suspend to RAM leaves a marker in CMOS.
                            if let Some(nvram) = self.callbacks.nvram.as_mut() {
                                nvram.write_byte(0x000f, 0xff);
                            }
                        }

                        if sus_typ.contains(SuspendType::RESET_PCI) {
                            self.callbacks.bus.reset_all_pci_devices();
                        }

                        if sus_typ.contains(SuspendType::RESET_CPU) {
                            self.callbacks.cpu.set_alternate_reset_mode(false);
                        }

                        if sus_typ.contains(SuspendType::RESET_PCI) {
                            self.callbacks.bus.reset_pci_bus();
                            self.callbacks.bus.reset_keyboard_controller();
                            self.callbacks.bus.set_a20_alt(false);
                        }

                        if sus_typ
                            .intersects(SuspendType::RESET_CPU | SuspendType::RESET_CACHE)
                        {
                            self.callbacks.cpu.flush_caches();
                        }

                        if sus_typ.contains(SuspendType::RESET_CPU) {
                            self.callbacks.cpu.request_reset();
                        }

                        // Pause the emulation and post a resume event so the
                        // guest wakes as if it had slept.
                        self.callbacks.platform.pause(true);
                        self.resume_deadline =
                            Some(self.clock.ticks() + self.resume_delay_ticks());
                    }
                }
                self.regs.pmcntrl = ((self.regs.pmcntrl & !(0xff << shift16))
                    | (u16::from(val) << shift16))
                    & PMCNTRL_VALID_MASK;
            }
            _ => {}
        }
    }
}

pub type SharedAcpiDevice<C = NullClock> = Rc<RefCell<AcpiDevice<C>>>;

struct AcpiIoWindow<C: Clock> {
    dev: SharedAcpiDevice<C>,
    aux: bool,
}

impl<C: Clock + 'static> PortIoDevice for AcpiIoWindow<C> {
    fn read(&mut self, port: u16, size: u8) -> u32 {
        if self.aux {
            self.dev.borrow_mut().read_aux(port, size)
        } else {
            self.dev.borrow_mut().read(port, size)
        }
    }

    fn write(&mut self, port: u16, size: u8, value: u32) {
        if self.aux {
            self.dev.borrow_mut().write_aux(port, size, value);
        } else {
            self.dev.borrow_mut().write(port, size, value);
        }
    }

    fn reset(&mut self) {
        self.dev.borrow_mut().reset();
    }
}

/// Move the primary register window.
///
/// Any previous mapping is torn down first, then a window of the profile's
/// fixed size is registered at `base` when the chipset enable is set and the
/// base is non-zero; remapping to the same base never double-registers.
pub fn update_io_mapping<C: Clock + 'static>(
    bus: &mut IoPortBus,
    dev: &SharedAcpiDevice<C>,
    base: u16,
    chipset_en: bool,
) {
    let (old_base, len) = {
        let dev = dev.borrow();
        (dev.io_base, dev.profile.io_window_len())
    };

    debug!(old_base, base, chipset_en, "acpi io remap");

    if old_base != 0 {
        bus.unregister_range_device(old_base, len);
    }

    dev.borrow_mut().io_base = base;

    if chipset_en && base != 0 {
        bus.register_range(
            base,
            len,
            Box::new(AcpiIoWindow {
                dev: dev.clone(),
                aux: false,
            }),
        );
    }
}

/// Move the auxiliary register window (profiles without one have a
/// zero-sized window and only track the base).
pub fn update_aux_io_mapping<C: Clock + 'static>(
    bus: &mut IoPortBus,
    dev: &SharedAcpiDevice<C>,
    base: u16,
    chipset_en: bool,
) {
    let (old_base, len) = {
        let dev = dev.borrow();
        (dev.aux_io_base, dev.profile.aux_io_window_len())
    };

    debug!(old_base, base, chipset_en, "acpi aux io remap");

    if old_base != 0 && len != 0 {
        bus.unregister_range_device(old_base, len);
    }

    dev.borrow_mut().aux_io_base = base;

    if chipset_en && base != 0 && len != 0 {
        bus.register_range(
            base,
            len,
            Box::new(AcpiIoWindow {
                dev: dev.clone(),
                aux: true,
            }),
        );
    }
}

impl<C: Clock> IoSnapshot for AcpiDevice<C> {
    const DEVICE_ID: [u8; 4] = *b"ACPM";
    const DEVICE_VERSION: SnapshotVersion = SnapshotVersion::new(1, 0);

    fn save_state(&self) -> Vec<u8> {
        let mut w = SnapshotWriter::new(Self::DEVICE_ID, Self::DEVICE_VERSION);

        w.field_u16(tags::PMSTS, self.regs.pmsts);
        w.field_u16(tags::PMEN, self.regs.pmen);
        w.field_u16(tags::PMCNTRL, self.regs.pmcntrl);
        w.field_u16(tags::GPSTS, self.regs.gpsts);
        w.field_u16(tags::GPSTS1, self.regs.gpsts1);
        w.field_u16(tags::GPSCISTS, self.regs.gpscists);
        w.field_u16(tags::GPEN, self.regs.gpen);
        w.field_u16(tags::GPEN1, self.regs.gpen1);
        w.field_u16(tags::GPSCIEN, self.regs.gpscien);
        w.field_u16(tags::GPSMIEN, self.regs.gpsmien);
        w.field_u16(tags::PSCNTRL, self.regs.pscntrl);
        w.field_u32(tags::GPCNTRL, self.regs.gpcntrl);
        w.field_u32(tags::PCNTRL, self.regs.pcntrl);
        w.field_u8(tags::PLVL2, self.regs.plvl2);
        w.field_u8(tags::PLVL3, self.regs.plvl3);
        w.field_u8(tags::SMICMD, self.regs.smicmd);
        w.field_u16(tags::GLBSTS, self.regs.glbsts);
        w.field_u32(tags::DEVSTS, self.regs.devsts);
        w.field_u16(tags::GLBEN, self.regs.glben);
        w.field_u32(tags::GLBCTL, self.regs.glbctl);
        w.field_u32(tags::DEVCTL, self.regs.devctl);
        w.field_u32(tags::PADSTS, self.regs.padsts);
        w.field_u32(tags::PADEN, self.regs.paden);
        w.field_u32(tags::GPTREN, self.regs.gptren);
        w.field_bytes(tags::GPIREG, self.regs.gpireg.to_vec());
        w.field_bytes(tags::GPOREG, self.regs.gporeg.to_vec());
        w.field_u8(tags::GPIO_DIR, self.regs.gpio_dir);
        w.field_u8(tags::GPIO_VAL, self.regs.gpio_val);
        w.field_u16(tags::EXTSMI_VAL, self.regs.extsmi_val);
        w.field_u32(tags::GPO_VAL, self.regs.gpo_val);
        w.field_u32(tags::GPI_VAL, self.regs.gpi_val);
        w.field_u8(tags::EXTIOTRAPSTS, self.regs.extiotrapsts);
        w.field_u8(tags::EXTIOTRAPEN, self.regs.extiotrapen);
        w.field_u32(tags::SMI_EN, self.regs.smi_en);
        w.field_u32(tags::SMI_STS, self.regs.smi_sts);
        w.field_u16(tags::MON_SMI, self.regs.mon_smi);
        w.field_u16(tags::DEVACT_STS, self.regs.devact_sts);
        w.field_u16(tags::DEVTRAP_EN, self.regs.devtrap_en);
        w.field_u16(tags::BUS_ADDR_TRACK, self.regs.bus_addr_track);
        w.field_u8(tags::BUS_CYC_TRACK, self.regs.bus_cyc_track);

        let mut flags = 0u8;
        flags |= self.regs.ali_soft_smi as u8;
        flags |= (self.regs.smi_lock as u8) << 1;
        flags |= (self.regs.smi_active as u8) << 2;
        flags |= (self.regs.timer32 as u8) << 3;
        w.field_u8(tags::FLAGS, flags);

        // The overflow deadline is derivable from enable/status state and is
        // rearmed on restore; only the resume timer's remaining delay is
        // carried.
        if let Some(deadline) = self.resume_deadline {
            w.field_u64(
                tags::RESUME_REMAINING,
                deadline.saturating_sub(self.clock.ticks()),
            );
        }

        // Host wiring, the clock, and the I/O bases (owned by the chipset's
        // config space) are intentionally not serialized.
        w.finish()
    }

    fn load_state(&mut self, bytes: &[u8]) -> SnapshotResult<()> {
        let r = SnapshotReader::parse(bytes, Self::DEVICE_ID)?;
        r.ensure_device_major(Self::DEVICE_VERSION.major)?;

        self.regs = AcpiRegisters::at_power_on(
            self.profile,
            self.gpireg2_default,
            self.gporeg_default,
            self.timer32_default,
        );
        self.resume_deadline = None;

        if let Some(v) = r.u16(tags::PMSTS)? {
            self.regs.pmsts = v;
        }
        if let Some(v) = r.u16(tags::PMEN)? {
            self.regs.pmen = v;
        }
        if let Some(v) = r.u16(tags::PMCNTRL)? {
            self.regs.pmcntrl = v;
        }
        if let Some(v) = r.u16(tags::GPSTS)? {
            self.regs.gpsts = v;
        }
        if let Some(v) = r.u16(tags::GPSTS1)? {
            self.regs.gpsts1 = v;
        }
        if let Some(v) = r.u16(tags::GPSCISTS)? {
            self.regs.gpscists = v;
        }
        if let Some(v) = r.u16(tags::GPEN)? {
            self.regs.gpen = v;
        }
        if let Some(v) = r.u16(tags::GPEN1)? {
            self.regs.gpen1 = v;
        }
        if let Some(v) = r.u16(tags::GPSCIEN)? {
            self.regs.gpscien = v;
        }
        if let Some(v) = r.u16(tags::GPSMIEN)? {
            self.regs.gpsmien = v;
        }
        if let Some(v) = r.u16(tags::PSCNTRL)? {
            self.regs.pscntrl = v;
        }
        if let Some(v) = r.u32(tags::GPCNTRL)? {
            self.regs.gpcntrl = v;
        }
        if let Some(v) = r.u32(tags::PCNTRL)? {
            self.regs.pcntrl = v;
        }
        if let Some(v) = r.u8(tags::PLVL2)? {
            self.regs.plvl2 = v;
        }
        if let Some(v) = r.u8(tags::PLVL3)? {
            self.regs.plvl3 = v;
        }
        if let Some(v) = r.u8(tags::SMICMD)? {
            self.regs.smicmd = v;
        }
        if let Some(v) = r.u16(tags::GLBSTS)? {
            self.regs.glbsts = v;
        }
        if let Some(v) = r.u32(tags::DEVSTS)? {
            self.regs.devsts = v;
        }
        if let Some(v) = r.u16(tags::GLBEN)? {
            self.regs.glben = v;
        }
        if let Some(v) = r.u32(tags::GLBCTL)? {
            self.regs.glbctl = v;
        }
        if let Some(v) = r.u32(tags::DEVCTL)? {
            self.regs.devctl = v;
        }
        if let Some(v) = r.u32(tags::PADSTS)? {
            self.regs.padsts = v;
        }
        if let Some(v) = r.u32(tags::PADEN)? {
            self.regs.paden = v;
        }
        if let Some(v) = r.u32(tags::GPTREN)? {
            self.regs.gptren = v;
        }
        if let Some(buf) = r.bytes(tags::GPIREG) {
            for (dst, src) in self.regs.gpireg.iter_mut().zip(buf.iter().copied()) {
                *dst = src;
            }
        }
        if let Some(buf) = r.bytes(tags::GPOREG) {
            for (dst, src) in self.regs.gporeg.iter_mut().zip(buf.iter().copied()) {
                *dst = src;
            }
        }
        if let Some(v) = r.u8(tags::GPIO_DIR)? {
            self.regs.gpio_dir = v;
        }
        if let Some(v) = r.u8(tags::GPIO_VAL)? {
            self.regs.gpio_val = v;
        }
        if let Some(v) = r.u16(tags::EXTSMI_VAL)? {
            self.regs.extsmi_val = v;
        }
        if let Some(v) = r.u32(tags::GPO_VAL)? {
            self.regs.gpo_val = v;
        }
        if let Some(v) = r.u32(tags::GPI_VAL)? {
            self.regs.gpi_val = v;
        }
        if let Some(v) = r.u8(tags::EXTIOTRAPSTS)? {
            self.regs.extiotrapsts = v;
        }
        if let Some(v) = r.u8(tags::EXTIOTRAPEN)? {
            self.regs.extiotrapen = v;
        }
        if let Some(v) = r.u32(tags::SMI_EN)? {
            self.regs.smi_en = v;
        }
        if let Some(v) = r.u32(tags::SMI_STS)? {
            self.regs.smi_sts = v;
        }
        if let Some(v) = r.u16(tags::MON_SMI)? {
            self.regs.mon_smi = v;
        }
        if let Some(v) = r.u16(tags::DEVACT_STS)? {
            self.regs.devact_sts = v;
        }
        if let Some(v) = r.u16(tags::DEVTRAP_EN)? {
            self.regs.devtrap_en = v;
        }
        if let Some(v) = r.u16(tags::BUS_ADDR_TRACK)? {
            self.regs.bus_addr_track = v;
        }
        if let Some(v) = r.u8(tags::BUS_CYC_TRACK)? {
            self.regs.bus_cyc_track = v;
        }
        if let Some(flags) = r.u8(tags::FLAGS)? {
            self.regs.ali_soft_smi = flags & 0x01 != 0;
            self.regs.smi_lock = flags & 0x02 != 0;
            self.regs.smi_active = flags & 0x04 != 0;
            self.regs.timer32 = flags & 0x08 != 0;
        }

        if let Some(remaining) = r.u64(tags::RESUME_REMAINING)? {
            self.resume_deadline = Some(self.clock.ticks() + remaining);
        }

        // Re-drive SCI and the overflow timer from the restored state.
        self.update_irq();

        Ok(())
    }
}

mod tags {
    pub const PMSTS: u16 = 1;
    pub const PMEN: u16 = 2;
    pub const PMCNTRL: u16 = 3;
    pub const GPSTS: u16 = 4;
    pub const GPSTS1: u16 = 5;
    pub const GPSCISTS: u16 = 6;
    pub const GPEN: u16 = 7;
    pub const GPEN1: u16 = 8;
    pub const GPSCIEN: u16 = 9;
    pub const GPSMIEN: u16 = 10;
    pub const PSCNTRL: u16 = 11;
    pub const GPCNTRL: u16 = 12;
    pub const PCNTRL: u16 = 13;
    pub const PLVL2: u16 = 14;
    pub const PLVL3: u16 = 15;
    pub const SMICMD: u16 = 16;
    pub const GLBSTS: u16 = 17;
    pub const DEVSTS: u16 = 18;
    pub const GLBEN: u16 = 19;
    pub const GLBCTL: u16 = 20;
    pub const DEVCTL: u16 = 21;
    pub const PADSTS: u16 = 22;
    pub const PADEN: u16 = 23;
    pub const GPTREN: u16 = 24;
    pub const GPIREG: u16 = 25;
    pub const GPOREG: u16 = 26;
    pub const GPIO_DIR: u16 = 27;
    pub const GPIO_VAL: u16 = 28;
    pub const EXTSMI_VAL: u16 = 29;
    pub const GPO_VAL: u16 = 30;
    pub const GPI_VAL: u16 = 31;
    pub const EXTIOTRAPSTS: u16 = 32;
    pub const EXTIOTRAPEN: u16 = 33;
    pub const SMI_EN: u16 = 34;
    pub const SMI_STS: u16 = 35;
    pub const MON_SMI: u16 = 36;
    pub const DEVACT_STS: u16 = 37;
    pub const DEVTRAP_EN: u16 = 38;
    pub const BUS_ADDR_TRACK: u16 = 39;
    pub const BUS_CYC_TRACK: u16 = 40;
    pub const FLAGS: u16 = 41;
    pub const RESUME_REMAINING: u16 = 42;
}
