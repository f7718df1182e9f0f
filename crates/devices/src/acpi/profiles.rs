//! Per-profile register decode tables.
//!
//! Each profile handles the registers it knows and falls through to the
//! common block in `mod.rs` for everything else. Handlers mask the raw port
//! down to the profile's window width first, so the window aliases the way
//! the silicon does.
//!
//! Two decode oddities are kept on purpose because firmware was written
//! against them: the ALi PCNTRL reads with a 16-bit byte-lane shift while
//! writes use the 32-bit one, and the ALi/ICH2 GPE1_EN writes merge over the
//! GPE0 enable register.

use tracing::trace;

use super::regs::*;
use super::AcpiDevice;
use crate::clock::Clock;

fn shift16(addr: u16) -> u32 {
    u32::from(addr & 1) << 3
}

fn shift32(addr: u16) -> u32 {
    u32::from(addr & 3) << 3
}

impl<C: Clock> AcpiDevice<C> {
    // ALi M1535+ (window 0x40).

    pub(crate) fn read_ali(&mut self, size: u8, addr: u16) -> u8 {
        let addr = addr & 0x3f;

        match addr {
            // PCNTRL - reads use the 16-bit byte lane, unlike writes.
            0x10..=0x13 => (self.regs.pcntrl >> shift16(addr)) as u8,
            // LVL2 / LVL3.
            0x14 => self.regs.plvl2,
            0x15 => self.regs.plvl3,
            // GPE0_STS / GPE0_EN.
            0x18 | 0x19 => (self.regs.gpsts >> shift16(addr)) as u8,
            0x1a | 0x1b => (self.regs.gpen >> shift16(addr)) as u8,
            // GPE1_STS / GPE1_EN.
            0x1c | 0x1d => (self.regs.gpsts1 >> shift16(addr)) as u8,
            0x1e | 0x1f => (self.regs.gpen1 >> shift16(addr)) as u8,
            // GPE1_CTL.
            0x20..=0x27 => (self.regs.gpcntrl >> shift32(addr)) as u8,
            // PM2_CNTRL.
            0x30 => self.regs.pmcntrl as u8,
            _ => self.read_common_regs(size, addr),
        }
    }

    pub(crate) fn write_ali(&mut self, size: u8, addr: u16, val: u8) {
        let addr = addr & 0x3f;

        match addr {
            // PCNTRL - writes use the 32-bit byte lane.
            0x10..=0x13 => {
                let sh = shift32(addr);
                self.regs.pcntrl = ((self.regs.pcntrl & !(0xff << sh))
                    | (u32::from(val) << sh))
                    & ALI_PCNTRL_VALID_MASK;
            }
            0x14 => self.regs.plvl2 = val,
            0x15 => self.regs.plvl3 = val,
            0x18 | 0x19 => {
                self.regs.gpsts &=
                    !((u16::from(val) << shift16(addr)) & ALI_GPE0_STS_CLEAR_MASK);
            }
            0x1a | 0x1b => {
                let sh = shift16(addr);
                self.regs.gpen = ((self.regs.gpen & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & ALI_GPE0_EN_VALID_MASK;
            }
            0x1c | 0x1d => {
                self.regs.gpsts1 &=
                    !((u16::from(val) << shift16(addr)) & ALI_GPE1_STS_CLEAR_MASK);
            }
            // GPE1_EN merges over the GPE0 enable register.
            0x1e | 0x1f => {
                let sh = shift16(addr);
                self.regs.gpen1 = ((self.regs.gpen & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & ALI_GPE1_EN_VALID_MASK;
            }
            0x20..=0x27 => {
                let sh = shift32(addr);
                self.regs.gpcntrl = ((self.regs.gpcntrl & !(0xff << sh))
                    | (u32::from(val) << sh))
                    & ALI_GPE1_CTL_VALID_MASK;
            }
            // PM2_CNTRL.
            0x30 => self.regs.pmcntrl = u16::from(val) & 1,
            _ => {
                self.write_common_regs(size, addr, val);
                if addr == 0x00 && self.regs.pmsts & GBL_STS == 0 {
                    self.regs.gpcntrl &= !0x0002;
                } else if addr == 0x04 && self.regs.pmcntrl & PMCNTRL_GBL_RLS != 0 {
                    // GBL_RLS sets the BIOS request status and raises an SMI.
                    self.regs.gpsts1 |= 0x01;
                    if self.regs.gpen1 & 0x01 != 0 {
                        self.raise_smi(true);
                    }
                }
            }
        }
    }

    // Intel PIIX4 (window 0x40).

    pub(crate) fn read_intel(&mut self, size: u8, addr: u16) -> u8 {
        let addr = addr & 0x3f;

        match addr {
            // GPSTS / GPEN.
            0x0c | 0x0d => (self.regs.gpsts >> shift16(addr)) as u8,
            0x0e | 0x0f => (self.regs.gpen >> shift16(addr)) as u8,
            // PCNTRL.
            0x10..=0x13 => (self.regs.pcntrl >> shift32(addr)) as u8,
            // GLBSTS - the low byte is composed live from the other status
            // blocks.
            0x18 | 0x19 => {
                let mut ret = (self.regs.glbsts >> shift16(addr)) as u8;
                if addr == 0x18 {
                    ret &= 0x27;
                    if self.regs.gpsts != 0x0000 {
                        ret |= 0x80;
                    }
                    if self.regs.pmsts != 0x0000 {
                        ret |= 0x40;
                    }
                    if self.regs.devsts != 0x0000_0000 {
                        ret |= 0x10;
                    }
                }
                ret
            }
            // DEVSTS / GLBEN / GLBCTL / DEVCTL.
            0x1c..=0x1f => (self.regs.devsts >> shift32(addr)) as u8,
            0x20 | 0x21 => (self.regs.glben >> shift16(addr)) as u8,
            0x28..=0x2b => (self.regs.glbctl >> shift32(addr)) as u8,
            0x2c..=0x2f => (self.regs.devctl >> shift32(addr)) as u8,
            // GPIREG / GPOREG decode byte cycles only.
            0x30..=0x32 if size == 1 => self.regs.gpireg[usize::from(addr & 3)],
            0x34..=0x37 if size == 1 => self.regs.gporeg[usize::from(addr & 3)],
            0x30..=0x32 | 0x34..=0x37 => 0x00,
            _ => self.read_common_regs(size, addr),
        }
    }

    pub(crate) fn write_intel(&mut self, size: u8, addr: u16, val: u8) {
        let addr = addr & 0x3f;

        match addr {
            0x0c | 0x0d => {
                self.regs.gpsts &=
                    !((u16::from(val) << shift16(addr)) & INTEL_GPSTS_CLEAR_MASK);
            }
            0x0e | 0x0f => {
                let sh = shift16(addr);
                self.regs.gpen = ((self.regs.gpen & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & INTEL_GPEN_VALID_MASK;
            }
            0x10 | 0x11 | 0x13 => {
                let sh = shift32(addr);
                self.regs.pcntrl = ((self.regs.pcntrl & !(0xff << sh))
                    | (u32::from(val) << sh))
                    & INTEL_PCNTRL_VALID_MASK;
            }
            // Byte 2 preserves the self-clearing stall bit.
            0x12 => {
                let sh = shift32(addr);
                self.regs.pcntrl = ((self.regs.pcntrl & !(0xfd << sh))
                    | (u32::from(val) << sh))
                    & INTEL_PCNTRL_VALID_MASK;
            }
            0x18 | 0x19 => {
                self.regs.glbsts &=
                    !((u16::from(val) << shift16(addr)) & INTEL_GLBSTS_CLEAR_MASK);
            }
            0x1c..=0x1f => {
                self.regs.devsts &=
                    !((u32::from(val) << shift32(addr)) & INTEL_DEVSTS_CLEAR_MASK);
            }
            0x20 | 0x21 => {
                let sh = shift16(addr);
                self.regs.glben = ((self.regs.glben & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & INTEL_GLBEN_VALID_MASK;
            }
            0x28..=0x2b => {
                let sh = shift32(addr);
                self.regs.glbctl = ((self.regs.glbctl & !(0xff << sh))
                    | (u32::from(val) << sh))
                    & INTEL_GLBCTL_VALID_MASK;
                // BIOS_RLS sets GBL_STS and can generate an SCI.
                if self.regs.glbctl & 0x0000_0002 != 0 {
                    self.regs.pmsts |= GBL_STS;
                    if self.regs.pmen & GBL_EN != 0 {
                        self.update_irq();
                    }
                }
            }
            0x2c..=0x2f => {
                let sh = shift32(addr);
                self.regs.devctl = ((self.regs.devctl & !(0xff << sh))
                    | (u32::from(val) << sh))
                    & INTEL_DEVCTL_VALID_MASK;
                self.notify_trap_update();
            }
            0x34..=0x37 => {
                if size == 1 {
                    self.regs.gporeg[usize::from(addr & 3)] = val;
                }
            }
            _ => {
                self.write_common_regs(size, addr, val);
                if addr == 0x00 && self.regs.pmsts & GBL_STS == 0 {
                    self.regs.glbctl &= !0x0002;
                } else if addr == 0x04 && self.regs.pmcntrl & PMCNTRL_GBL_RLS != 0 {
                    // GBL_RLS sets BIOS_STS and raises an SMI.
                    self.regs.glbsts |= 0x01;
                    if self.regs.glben & 0x02 != 0 {
                        self.raise_smi(true);
                    }
                }
            }
        }
    }

    // Intel ICH2 (window 0x80, with the TCO watchdog block at 0x60).

    pub(crate) fn read_intel_ich2(&mut self, size: u8, addr: u16) -> u8 {
        let addr = addr & 0x7f;

        match addr {
            // PROC_CNT.
            0x10..=0x13 => (self.regs.pcntrl >> shift32(addr)) as u8,
            // GPE0_STS / GPE0_EN / GPE1_STS / GPE1_EN.
            0x28 | 0x29 => (self.regs.gpsts >> shift16(addr)) as u8,
            0x2a | 0x2b => (self.regs.gpen >> shift16(addr)) as u8,
            0x2c | 0x2d => (self.regs.gpsts1 >> shift16(addr)) as u8,
            0x2e | 0x2f => (self.regs.gpen1 >> shift16(addr)) as u8,
            // SMI_EN / SMI_STS.
            0x30..=0x33 => (self.regs.smi_en >> shift32(addr)) as u8,
            0x34..=0x37 => (self.regs.smi_sts >> shift32(addr)) as u8,
            // MON_SMI / DEVACT_STS / DEVTRAP_EN.
            0x40 | 0x41 => (self.regs.mon_smi >> shift16(addr)) as u8,
            0x44 | 0x45 => (self.regs.devact_sts >> shift16(addr)) as u8,
            0x48 | 0x49 => (self.regs.devtrap_en >> shift16(addr)) as u8,
            // BUS_ADDR_TRACK / BUS_CYC_TRACK.
            0x4c | 0x4d => (self.regs.bus_addr_track >> shift16(addr)) as u8,
            0x4e => self.regs.bus_cyc_track,
            // TCO watchdog window.
            0x60..=0x70 => match self.watchdog.as_mut() {
                Some(w) => w.read(addr),
                None => 0x00,
            },
            _ => self.read_common_regs(size, addr),
        }
    }

    pub(crate) fn write_intel_ich2(&mut self, size: u8, addr: u16, val: u8) {
        let addr = addr & 0x7f;

        match addr {
            0x10..=0x13 => {
                let sh = shift32(addr);
                self.regs.pcntrl = ((self.regs.pcntrl & !(0xff << sh))
                    | (u32::from(val) << sh))
                    & ICH2_PCNTRL_VALID_MASK;
            }
            0x28 | 0x29 => {
                self.regs.gpsts &=
                    !((u16::from(val) << shift16(addr)) & ICH2_GPE_STS_CLEAR_MASK);
            }
            0x2a | 0x2b => {
                let sh = shift16(addr);
                self.regs.gpen = ((self.regs.gpen & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & ICH2_GPE_EN_VALID_MASK;
            }
            0x2c | 0x2d => {
                self.regs.gpsts1 &=
                    !((u16::from(val) << shift16(addr)) & ICH2_GPE_STS_CLEAR_MASK);
            }
            // GPE1_EN merges over the GPE0 enable register.
            0x2e | 0x2f => {
                let sh = shift16(addr);
                self.regs.gpen1 = ((self.regs.gpen & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & ICH2_GPE_EN_VALID_MASK;
            }
            0x30..=0x33 => {
                let sh = shift32(addr);
                self.regs.smi_en = ((self.regs.smi_en & !(0xff << sh))
                    | (u32::from(val) << sh))
                    & ICH2_SMI_EN_VALID_MASK;

                if addr == 0x30 {
                    // APMC_EN gates the APM shim's ability to generate SMIs.
                    let do_smi = val & (ICH2_SMI_EN_APMC as u8) != 0;
                    if let Some(f) = self.callbacks.apm_set_do_smi.as_mut() {
                        f(do_smi);
                    }

                    if val & 0x80 != 0 {
                        self.regs.glbsts |= 0x0020;
                        self.update_irq();
                    }
                }
            }
            0x34..=0x37 => {
                self.regs.smi_sts &=
                    !((u32::from(val) << shift32(addr)) & ICH2_SMI_STS_CLEAR_MASK);
            }
            0x40 | 0x41 => {
                let sh = shift16(addr);
                self.regs.mon_smi = ((self.regs.mon_smi & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & ICH2_MON_SMI_VALID_MASK;
            }
            0x44 | 0x45 => {
                self.regs.devact_sts &=
                    !((u16::from(val) << shift16(addr)) & ICH2_DEVACT_STS_CLEAR_MASK);
            }
            0x48 | 0x49 => {
                let sh = shift16(addr);
                self.regs.devtrap_en = ((self.regs.devtrap_en & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & ICH2_DEVTRAP_EN_VALID_MASK;
                self.notify_trap_update();
            }
            0x4c | 0x4d => {
                let sh = shift16(addr);
                self.regs.bus_addr_track = ((self.regs.bus_addr_track & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & ICH2_BUS_ADDR_TRACK_VALID_MASK;
            }
            0x4e => self.regs.bus_cyc_track = val,
            0x60..=0x70 => {
                if let Some(w) = self.watchdog.as_mut() {
                    w.write(addr, val);
                }
            }
            _ => {
                self.write_common_regs(size, addr, val);
                // BIOS_EN converts a GBL_RLS write into an SMI; the status
                // register is replaced, not accumulated.
                if addr == 0x04 && val & 0x04 != 0 && self.regs.smi_en & ICH2_SMI_EN_BIOS != 0 {
                    self.regs.smi_sts = 0x0000_0004;
                    self.raise_smi(true);
                }

                if addr == 0x02 || val & 0x20 != 0 || self.regs.glbsts & 0x0020 != 0 {
                    self.update_irq();
                }
            }
        }
    }

    // VIA block shared by the VT82C586B/596A and VT82C596B layouts.

    fn read_via_common(&mut self, size: u8, addr: u16) -> u8 {
        let addr = addr & 0xff;

        match addr {
            // PCNTRL.
            0x10..=0x13 => (self.regs.pcntrl >> shift32(addr)) as u8,
            // GPSTS / GP SCI + SMI enables / power supply control.
            0x20 | 0x21 => (self.regs.gpsts >> shift16(addr)) as u8,
            0x22 | 0x23 => (self.regs.gpscien >> shift16(addr)) as u8,
            0x24 | 0x25 => (self.regs.gpsmien >> shift16(addr)) as u8,
            0x26 | 0x27 => (self.regs.pscntrl >> shift16(addr)) as u8,
            0x28 | 0x29 => (self.regs.glbsts >> shift16(addr)) as u8,
            0x2a | 0x2b => (self.regs.glben >> shift16(addr)) as u8,
            // GLBCTL - the lock and active flags shadow the stored bits.
            0x2c | 0x2d => {
                let mut ret = (self.regs.glbctl >> shift16(addr)) as u8;
                ret &= !0x10;
                ret |= if self.regs.smi_lock { 0x10 } else { 0x00 };
                ret |= if self.regs.smi_active { 0x01 } else { 0x00 };
                ret
            }
            // SMI command decodes byte cycles only.
            0x2f if size == 1 => self.regs.smicmd,
            0x2f => 0x00,
            // Primary activity detect and the GP timer reload enable.
            0x30..=0x33 => (self.regs.padsts >> shift32(addr)) as u8,
            0x34..=0x37 => (self.regs.paden >> shift32(addr)) as u8,
            0x38..=0x3b => (self.regs.gptren >> shift32(addr)) as u8,
            _ => self.read_common_regs(size, addr),
        }
    }

    fn write_via_common(&mut self, size: u8, addr: u16, val: u8) {
        let addr = addr & 0xff;

        match addr {
            0x10..=0x13 => {
                let sh = shift32(addr);
                self.regs.pcntrl = ((self.regs.pcntrl & !(0xff << sh))
                    | (u32::from(val) << sh))
                    & VIA_PCNTRL_VALID_MASK;
            }
            0x20 | 0x21 => {
                self.regs.gpsts &=
                    !((u16::from(val) << shift16(addr)) & VIA_GPSTS_CLEAR_MASK);
            }
            0x22 | 0x23 => {
                let sh = shift16(addr);
                self.regs.gpscien = ((self.regs.gpscien & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & VIA_GPSCIEN_VALID_MASK;
            }
            0x24 | 0x25 => {
                let sh = shift16(addr);
                self.regs.gpsmien = ((self.regs.gpsmien & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & VIA_GPSMIEN_VALID_MASK;
            }
            0x26 | 0x27 => {
                let sh = shift16(addr);
                self.regs.pscntrl = ((self.regs.pscntrl & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & VIA_PSCNTRL_VALID_MASK;
            }
            // GLBCTL low byte: replaced wholesale, and the SMI lock shadows
            // bit 4.
            0x2c => {
                self.regs.glbctl = (self.regs.glbctl & !0xff) | u32::from(val);
                self.regs.smi_lock = self.regs.glbctl & 0x0010 != 0;
                // BIOS_RLS sets GBL_STS and can generate an SCI.
                if self.regs.glbctl & 0x0002 != 0 {
                    self.regs.pmsts |= GBL_STS;
                    if self.regs.pmen & GBL_EN != 0 {
                        self.update_irq();
                    }
                }
            }
            // GLBCTL high byte: write-1-to-clear for bit 8, and bit 0
            // releases the SMI-active latch.
            0x2d => {
                self.regs.glbctl &= !((u32::from(val) << 8) & 0x0100);
                if val & 0x01 != 0 {
                    self.regs.smi_active = false;
                }
            }
            0x2f => {
                if size == 1 {
                    self.regs.smicmd = val;
                    self.regs.glbsts |= 0x40;
                    if self.regs.glben & 0x40 != 0 {
                        self.raise_smi(true);
                    }
                }
            }
            0x38..=0x3b => {
                let sh = shift32(addr);
                self.regs.gptren = ((self.regs.gptren & !(0xff << sh))
                    | (u32::from(val) << sh))
                    & VIA_GPTREN_VALID_MASK;
            }
            _ => {
                self.write_common_regs(size, addr, val);
                if addr == 0x00 && self.regs.pmsts & GBL_STS == 0 {
                    self.regs.glbctl &= !0x0002;
                } else if addr == 0x04 && self.regs.pmcntrl & PMCNTRL_GBL_RLS != 0 {
                    // GBL_RLS sets BIOS_STS and raises an SMI.
                    self.regs.glbsts |= 0x20;
                    if self.regs.glben & 0x20 != 0 {
                        self.raise_smi(true);
                    }
                }
            }
        }
    }

    // VIA VT82C586B/596A (window 0x100).

    pub(crate) fn read_via(&mut self, size: u8, addr: u16) -> u8 {
        let addr = addr & 0xff;

        match addr {
            // GPIO direction / output, byte cycles only.
            0x40 if size == 1 => self.regs.gpio_dir,
            0x42 if size == 1 => self.regs.gpio_val & VIA_GPIO_VAL_VALID_MASK,
            // GPIO input: the SMBus lines are sampled live on inputs.
            0x44 if size == 1 => {
                let mut ret = self.regs.extsmi_val as u8;
                if let Some(smbus) = self.smbus.as_ref() {
                    ret &= 0xf9;
                    if self.regs.gpio_dir & 0x02 == 0 && smbus.scl() {
                        ret |= 0x02;
                    }
                    if self.regs.gpio_dir & 0x04 == 0 && smbus.sda() {
                        ret |= 0x04;
                    }
                }
                ret
            }
            0x40 | 0x42 | 0x44 => 0x00,
            // GPO output / GPI input.
            0x46 | 0x47 => (self.regs.gpo_val >> shift16(addr)) as u8,
            0x48 | 0x49 => (self.regs.gpi_val >> shift16(addr)) as u8,
            _ => self.read_via_common(size, addr),
        }
    }

    pub(crate) fn write_via(&mut self, size: u8, addr: u16, val: u8) {
        let addr = addr & 0xff;

        match addr {
            0x28 | 0x29 => {
                self.regs.glbsts &=
                    !((u16::from(val) << shift16(addr)) & VIA_GLBSTS_CLEAR_MASK);
            }
            0x2a | 0x2b => {
                let sh = shift16(addr);
                self.regs.glben = ((self.regs.glben & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & VIA_GLBEN_VALID_MASK;
            }
            0x30..=0x33 => {
                self.regs.padsts &=
                    !((u32::from(val) << shift32(addr)) & VIA_PADSTS_CLEAR_MASK);
            }
            0x34..=0x37 => {
                let sh = shift32(addr);
                self.regs.paden = ((self.regs.paden & !(0xff << sh))
                    | (u32::from(val) << sh))
                    & VIA_PADEN_VALID_MASK;
                self.notify_trap_update();
            }
            0x40 => {
                if size == 1 {
                    self.regs.gpio_dir = val & VIA_GPIO_DIR_VALID_MASK;
                    self.drive_smbus_gpio();
                }
            }
            0x42 => {
                if size == 1 {
                    self.regs.gpio_val = val & VIA_GPIO_VAL_VALID_MASK;
                    self.drive_smbus_gpio();
                }
            }
            0x46 | 0x47 => {
                let sh = shift16(addr);
                self.regs.gpo_val = ((self.regs.gpo_val & !(0xff << sh))
                    | (u32::from(val) << sh))
                    & 0xffff;
            }
            _ => self.write_via_common(size, addr, val),
        }
    }

    /// A GPIO pin configured as output drives its line; as input the line
    /// floats high.
    fn drive_smbus_gpio(&mut self) {
        let dir = self.regs.gpio_dir;
        let val = self.regs.gpio_val;
        if let Some(smbus) = self.smbus.as_mut() {
            let scl = dir & 0x02 == 0 || val & 0x02 != 0;
            let sda = dir & 0x04 == 0 || val & 0x04 != 0;
            trace!(scl, sda, "smbus gpio drive");
            smbus.set_lines(scl, sda);
        }
    }

    fn notify_trap_update(&mut self) {
        if let Some(f) = self.trap_update.as_mut() {
            f();
        }
    }

    // VIA VT82C596B/686A/B (window 0x80).

    pub(crate) fn read_via_596b(&mut self, size: u8, addr: u16) -> u8 {
        let addr = addr & 0x7f;

        match addr {
            // Extended I/O trap status / enable (686A/B).
            0x40 => self.regs.extiotrapsts,
            0x42 => self.regs.extiotrapen,
            // External SMI input.
            0x44 | 0x45 => (self.regs.extsmi_val >> shift16(addr)) as u8,
            // GPI input / GPO output, 32 bits wide on this family.
            0x48..=0x4b => (self.regs.gpi_val >> shift32(addr)) as u8,
            0x4c..=0x4f => (self.regs.gpo_val >> shift32(addr)) as u8,
            _ => self.read_via_common(size, addr),
        }
    }

    pub(crate) fn write_via_596b(&mut self, size: u8, addr: u16, val: u8) {
        let addr = addr & 0x7f;

        match addr {
            0x28 | 0x29 => {
                self.regs.glbsts &=
                    !((u16::from(val) << shift16(addr)) & VIA_596B_GLBSTS_CLEAR_MASK);
            }
            0x2a | 0x2b => {
                let sh = shift16(addr);
                self.regs.glben = ((self.regs.glben & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & VIA_596B_GLBEN_VALID_MASK;
            }
            0x30..=0x33 => {
                self.regs.padsts &=
                    !((u32::from(val) << shift32(addr)) & VIA_596B_PADSTS_CLEAR_MASK);
            }
            0x34..=0x37 => {
                let sh = shift32(addr);
                self.regs.paden = ((self.regs.paden & !(0xff << sh))
                    | (u32::from(val) << sh))
                    & VIA_596B_PADEN_VALID_MASK;
                self.notify_trap_update();
            }
            0x40 => {
                self.regs.extiotrapsts &= !(val & VIA_596B_EXTIOTRAP_VALID_MASK);
            }
            0x42 => self.regs.extiotrapen = val & VIA_596B_EXTIOTRAP_VALID_MASK,
            0x4c..=0x4f => {
                let sh = shift32(addr);
                self.regs.gpo_val = ((self.regs.gpo_val & !(0xff << sh))
                    | (u32::from(val) << sh))
                    & VIA_596B_GPO_VALID_MASK;
            }
            _ => self.write_via_common(size, addr, val),
        }
    }

    // SMC FDC73C931APM (window 0x10, plus the 8-byte auxiliary window).

    pub(crate) fn read_smc(&mut self, size: u8, addr: u16) -> u8 {
        self.read_common_regs(size, addr & 0x0f)
    }

    pub(crate) fn write_smc(&mut self, size: u8, addr: u16, val: u8) {
        let addr = addr & 0x0f;

        self.write_common_regs(size, addr, val);
        if addr == 0x00 && self.regs.pmsts & GBL_STS == 0 {
            self.regs.glbctl &= !0x0001;
        } else if addr == 0x04 && self.regs.pmcntrl & PMCNTRL_GBL_RLS != 0 {
            // GBL_RLS sets BIOS_STS and raises an SMI.
            self.regs.glbsts |= 0x01;
            if self.regs.glben & 0x01 != 0 {
                self.raise_smi(true);
            }
        }
    }

    pub(crate) fn aux_read_smc(&mut self, _size: u8, addr: u16) -> u8 {
        let addr = addr & 0x07;

        match addr {
            // SCI status.
            0x00 | 0x01 => (self.regs.pcntrl >> shift16(addr)) as u8,
            // SCI enable.
            0x02 | 0x03 => (self.regs.gpscien >> shift16(addr)) as u8,
            // Miscellaneous status / enable / control.
            0x04 | 0x05 => (self.regs.glbsts >> shift16(addr)) as u8,
            0x06 => self.regs.glben as u8,
            0x07 => self.regs.glbctl as u8,
            _ => unreachable!(),
        }
    }

    pub(crate) fn aux_write_smc(&mut self, _size: u8, addr: u16, val: u8) {
        let addr = addr & 0x07;

        match addr {
            0x00 | 0x01 => {
                self.regs.gpscists &=
                    !((u16::from(val) << shift16(addr)) & SMC_AUX_SCISTS_CLEAR_MASK);
            }
            0x02 | 0x03 => {
                let sh = shift16(addr);
                self.regs.gpscien = ((self.regs.gpscien & !(0xff << sh))
                    | (u16::from(val) << sh))
                    & SMC_AUX_SCIEN_VALID_MASK;
            }
            0x04 | 0x05 => {
                self.regs.glbsts &=
                    !((u16::from(val) << shift16(addr)) & SMC_AUX_MISCSTS_CLEAR_MASK);
            }
            0x06 => self.regs.glben = u16::from(val & SMC_AUX_MISCEN_VALID_MASK),
            0x07 => {
                self.regs.glbctl = u32::from(val & SMC_AUX_MISCCTL_VALID_MASK);
                // BIOS_RLS sets GBL_STS and can generate an SCI.
                if self.regs.glbctl & 0x0001 != 0 {
                    self.regs.pmsts |= GBL_STS;
                    if self.regs.pmen & GBL_EN != 0 {
                        self.update_irq();
                    }
                }
                if self.regs.glbctl & 0x0002 != 0 {
                    self.regs.pmsts |= BM_STS;
                    if self.regs.pmcntrl & 0x02 != 0 {
                        self.update_irq();
                    }
                }
            }
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{AcpiCallbacks, AcpiDevice, AcpiProfile};
    use crate::clock::ManualClock;

    fn device(profile: AcpiProfile) -> AcpiDevice<ManualClock> {
        AcpiDevice::new(profile, AcpiCallbacks::new(), ManualClock::new())
    }

    #[test]
    fn via_glbctl_read_shadows_smi_flags() {
        let mut dev = device(AcpiProfile::Via);
        dev.write(0x2c, 1, 0x12);
        // Bit 4 of the stored value reads back through the lock shadow.
        assert_eq!(dev.read(0x2c, 1) & 0x10, 0x10);
        dev.write(0x2d, 1, 0x01);
        dev.write(0x2c, 1, 0x02 | 0x01);
        assert_eq!(dev.read(0x2c, 1) & 0x10, 0x00);
    }

    #[test]
    fn via_gpio_regs_decode_byte_cycles_only() {
        let mut dev = device(AcpiProfile::Via);
        dev.write(0x40, 2, 0x7f7f);
        assert_eq!(dev.regs().gpio_dir, 0x00);
        dev.write(0x40, 1, 0x7f);
        assert_eq!(dev.regs().gpio_dir, 0x7f);
    }

    #[test]
    fn ali_pcntrl_read_write_lanes_differ() {
        let mut dev = device(AcpiProfile::Ali);
        // Byte 2 lands via the 32-bit lane on write.
        dev.write(0x12, 1, 0x02);
        assert_eq!(dev.regs().pcntrl, 0x0002_0000);
        // Reads only see the 16-bit lane, so byte 2 aliases byte 0.
        assert_eq!(dev.read(0x12, 1), 0x00);
        assert_eq!(dev.read(0x13, 1), 0x00);
    }

    #[test]
    fn intel_glbsts_low_byte_is_composed() {
        let mut dev = device(AcpiProfile::Intel);
        // Power-on WAK_STS makes the PM status group non-zero.
        assert_eq!(dev.read(0x18, 1) & 0x40, 0x40);
        dev.write(0x00, 2, 0x8d31);
        assert_eq!(dev.read(0x18, 1) & 0x40, 0x00);
    }

    #[test]
    fn smc_aux_window_miscctl_sets_gbl_sts() {
        let mut dev = device(AcpiProfile::Smc);
        dev.write_aux(0x07, 1, 0x01);
        assert_ne!(dev.regs().pmsts & super::GBL_STS, 0);
        assert_eq!(dev.regs().glbctl, 0x01);
    }
}
