//! Register file, profile classification and the mask constants that govern
//! every write.
//!
//! Each writable register has a valid-bits constant and each status register
//! a clearable-bits constant; the decode tables merge writes under these
//! masks and never inline magic values at the call site.

use bitflags::bitflags;

/// ACPI PM timer frequency in Hz, common to every profile.
pub const ACPI_TIMER_FREQ: f64 = 3_579_545.0;

// PMSTS - Power Management Status Register.
pub const TMROF_STS: u16 = 0x0001;
pub const BM_STS: u16 = 0x0010;
pub const GBL_STS: u16 = 0x0020;
pub const PWRBTN_STS: u16 = 0x0100;
pub const RTC_STS: u16 = 0x0400;
pub const WAK_STS: u16 = 0x8000;

// PMEN - Power Management Resume Enable Register.
pub const TMROF_EN: u16 = 0x0001;
pub const GBL_EN: u16 = 0x0020;
pub const PWRBTN_EN: u16 = 0x0100;
pub const RTC_EN: u16 = 0x0400;

// PMCNTRL - Power Management Control Register.
pub const PMCNTRL_SCI_EN: u16 = 0x0001;
pub const PMCNTRL_GBL_RLS: u16 = 0x0004;
pub const PMCNTRL_SLP_EN: u8 = 0x20; // bit 13, seen as bit 5 of the high byte

// Common register block (all profiles).
pub const PMSTS_CLEAR_MASK: u16 = 0x8d31;
pub const PMEN_VALID_MASK: u16 = 0x0521;
pub const PMCNTRL_VALID_MASK: u16 = 0x3f07;

// ALi M1535+.
pub const ALI_PCNTRL_VALID_MASK: u32 = 0x0002_3e1e;
pub const ALI_GPE0_STS_CLEAR_MASK: u16 = 0x0d07;
pub const ALI_GPE0_EN_VALID_MASK: u16 = 0x0d07;
pub const ALI_GPE1_STS_CLEAR_MASK: u16 = 0x0c01;
pub const ALI_GPE1_EN_VALID_MASK: u16 = 0x0c01;
pub const ALI_GPE1_CTL_VALID_MASK: u32 = 0x0000_0001;

// Intel PIIX4.
pub const INTEL_GPSTS_CLEAR_MASK: u16 = 0x0f81;
pub const INTEL_GPEN_VALID_MASK: u16 = 0x0f01;
pub const INTEL_PCNTRL_VALID_MASK: u32 = 0x0002_3e1e;
pub const INTEL_GLBSTS_CLEAR_MASK: u16 = 0x0d27;
pub const INTEL_DEVSTS_CLEAR_MASK: u32 = 0x3fff_0fff;
pub const INTEL_GLBEN_VALID_MASK: u16 = 0x8d1f;
pub const INTEL_GLBCTL_VALID_MASK: u32 = 0x0701_ff07;
pub const INTEL_DEVCTL_VALID_MASK: u32 = 0x0fff_ffff;

// Intel ICH2.
pub const ICH2_PCNTRL_VALID_MASK: u32 = 0x0002_01fe;
pub const ICH2_GPE_STS_CLEAR_MASK: u16 = 0x09fb;
pub const ICH2_GPE_EN_VALID_MASK: u16 = 0x097d;
pub const ICH2_SMI_EN_VALID_MASK: u32 = 0x0000_867f;
pub const ICH2_SMI_STS_CLEAR_MASK: u32 = 0x0001_ff7c;
pub const ICH2_MON_SMI_VALID_MASK: u16 = 0x097d;
pub const ICH2_DEVACT_STS_CLEAR_MASK: u16 = 0x3fef;
pub const ICH2_DEVTRAP_EN_VALID_MASK: u16 = 0x3c2f;
pub const ICH2_BUS_ADDR_TRACK_VALID_MASK: u16 = 0x097d;
pub const ICH2_SMI_EN_GBL_SMI: u32 = 0x0000_0001;
pub const ICH2_SMI_EN_BIOS: u32 = 0x0000_0004;
pub const ICH2_SMI_EN_SLP: u32 = 0x0000_0010;
pub const ICH2_SMI_EN_APMC: u32 = 0x0000_0020;

// VIA VT82C586B/596A (and the shared VIA block).
pub const VIA_PCNTRL_VALID_MASK: u32 = 0x0000_001e;
pub const VIA_GPSTS_CLEAR_MASK: u16 = 0x03ff;
pub const VIA_GPSCIEN_VALID_MASK: u16 = 0x03ff;
pub const VIA_GPSMIEN_VALID_MASK: u16 = 0x03ff;
pub const VIA_PSCNTRL_VALID_MASK: u16 = 0x0701;
pub const VIA_GLBSTS_CLEAR_MASK: u16 = 0x007f;
pub const VIA_GLBEN_VALID_MASK: u16 = 0x007f;
pub const VIA_PADSTS_CLEAR_MASK: u32 = 0x0000_00fd;
pub const VIA_PADEN_VALID_MASK: u32 = 0x0000_00fd;
pub const VIA_GPTREN_VALID_MASK: u32 = 0x0000_00d9;
pub const VIA_GPIO_DIR_VALID_MASK: u8 = 0x7f;
pub const VIA_GPIO_VAL_VALID_MASK: u8 = 0x13;

// VIA VT82C596B/686A/B extras.
pub const VIA_596B_GLBSTS_CLEAR_MASK: u16 = 0xfdff;
pub const VIA_596B_GLBEN_VALID_MASK: u16 = 0xfdff;
pub const VIA_596B_PADSTS_CLEAR_MASK: u32 = 0x0000_07ff;
pub const VIA_596B_PADEN_VALID_MASK: u32 = 0x0000_07ff;
pub const VIA_596B_EXTIOTRAP_VALID_MASK: u8 = 0x13;
pub const VIA_596B_GPO_VALID_MASK: u32 = 0x7fff_ffff;

// SMC FDC73C931APM auxiliary window.
pub const SMC_AUX_SCISTS_CLEAR_MASK: u16 = 0x000c;
pub const SMC_AUX_SCIEN_VALID_MASK: u16 = 0x3fff;
pub const SMC_AUX_MISCSTS_CLEAR_MASK: u16 = 0x001f;
pub const SMC_AUX_MISCEN_VALID_MASK: u8 = 0x03;
pub const SMC_AUX_MISCCTL_VALID_MASK: u8 = 0x03;

bitflags! {
    /// Effects a sleep-type code triggers when the guest sets SLP_EN.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SuspendType: u8 {
        const POWER_OFF = 0x01;
        const SUSPEND = 0x02;
        const NVR = 0x04;
        const RESET_CPU = 0x08;
        const RESET_PCI = 0x10;
        const RESET_CACHE = 0x20;
    }
}

/// Vendor/chipset-family register layout a device instance implements.
///
/// A device is bound to one profile for its whole lifetime; the profile
/// selects the decode tables, the I/O window sizes, the sleep-type table and
/// the SMI arbitration rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcpiProfile {
    Ali,
    Via,
    Via596b,
    Intel,
    IntelIch2,
    Smc,
}

impl AcpiProfile {
    /// Size of the primary register window in I/O ports.
    pub fn io_window_len(self) -> u16 {
        match self {
            AcpiProfile::Ali | AcpiProfile::Intel => 0x040,
            AcpiProfile::Smc => 0x010,
            AcpiProfile::Via => 0x100,
            AcpiProfile::IntelIch2 | AcpiProfile::Via596b => 0x080,
        }
    }

    /// Size of the auxiliary register window, zero for profiles without one.
    pub fn aux_io_window_len(self) -> u16 {
        match self {
            AcpiProfile::Smc => 0x008,
            _ => 0x000,
        }
    }

    /// Sleep-type decode table, indexed by the 3-bit SLP_TYP field.
    pub fn sleep_types(self) -> [SuspendType; 8] {
        let mut types = [SuspendType::empty(); 8];
        match self {
            AcpiProfile::Ali => {
                types[0] = SuspendType::POWER_OFF;
                types[1] = SuspendType::POWER_OFF;
                types[2] = SuspendType::SUSPEND
                    | SuspendType::NVR
                    | SuspendType::RESET_CPU
                    | SuspendType::RESET_PCI;
                types[3] = SuspendType::SUSPEND;
            }
            AcpiProfile::Via => {
                types[0] = SuspendType::POWER_OFF;
                types[2] = SuspendType::SUSPEND;
            }
            AcpiProfile::Via596b => {
                types[1] = SuspendType::SUSPEND
                    | SuspendType::NVR
                    | SuspendType::RESET_CPU
                    | SuspendType::RESET_PCI;
                types[2] = SuspendType::POWER_OFF;
                types[4] = SuspendType::SUSPEND;
                types[5] = SuspendType::SUSPEND | SuspendType::RESET_CPU;
                types[6] =
                    SuspendType::SUSPEND | SuspendType::RESET_CPU | SuspendType::RESET_PCI;
            }
            AcpiProfile::Intel => {
                types[0] = SuspendType::POWER_OFF;
                types[1] = SuspendType::SUSPEND
                    | SuspendType::NVR
                    | SuspendType::RESET_CPU
                    | SuspendType::RESET_PCI;
                types[2] = SuspendType::SUSPEND | SuspendType::RESET_CPU;
                types[3] = SuspendType::SUSPEND | SuspendType::RESET_CACHE;
                types[4] = SuspendType::SUSPEND;
            }
            AcpiProfile::IntelIch2 => {
                types[1] = SuspendType::SUSPEND | SuspendType::RESET_CPU;
                types[5] = SuspendType::SUSPEND
                    | SuspendType::NVR
                    | SuspendType::RESET_CPU
                    | SuspendType::RESET_PCI;
                types[6] = SuspendType::POWER_OFF;
                types[7] = SuspendType::POWER_OFF;
            }
            AcpiProfile::Smc => {}
        }
        types
    }
}

/// The persistent register state behind the decode tables.
///
/// Fields are sized as the widest profile sees them; profiles that treat a
/// register as narrower simply mask harder.
#[derive(Debug, Clone, Default)]
pub struct AcpiRegisters {
    pub pmsts: u16,
    pub pmen: u16,
    pub pmcntrl: u16,

    pub gpsts: u16,
    pub gpsts1: u16,
    pub gpscists: u16,
    pub gpen: u16,
    pub gpen1: u16,
    pub gpscien: u16,
    pub gpsmien: u16,
    pub pscntrl: u16,
    pub gpcntrl: u32,

    pub pcntrl: u32,
    pub plvl2: u8,
    pub plvl3: u8,

    pub smicmd: u8,
    pub glbsts: u16,
    pub devsts: u32,
    pub glben: u16,
    pub glbctl: u32,
    pub devctl: u32,

    pub padsts: u32,
    pub paden: u32,
    pub gptren: u32,

    pub gpireg: [u8; 3],
    pub gporeg: [u8; 4],
    pub gpio_dir: u8,
    pub gpio_val: u8,
    pub extsmi_val: u16,
    pub gpo_val: u32,
    pub gpi_val: u32,
    pub extiotrapsts: u8,
    pub extiotrapen: u8,

    pub smi_en: u32,
    pub smi_sts: u32,
    pub mon_smi: u16,
    pub devact_sts: u16,
    pub devtrap_en: u16,
    pub bus_addr_track: u16,
    pub bus_cyc_track: u8,

    pub ali_soft_smi: bool,
    pub smi_lock: bool,
    pub smi_active: bool,
    pub timer32: bool,
}

impl AcpiRegisters {
    /// Power-on register contents.
    ///
    /// Power-on always looks like a resume event: WAK_STS comes up set so
    /// firmware sees a wake rather than a cold status block.
    pub fn at_power_on(
        profile: AcpiProfile,
        gpireg2_default: u8,
        gporeg_default: [u8; 4],
        timer32: bool,
    ) -> Self {
        let mut regs = Self {
            timer32,
            ..Self::default()
        };
        regs.gpireg = [0xff, 0xff, gpireg2_default];
        regs.gporeg = gporeg_default;
        if profile == AcpiProfile::Via596b {
            regs.gpo_val = 0x7fff_ffff;
            regs.gpi_val = 0xfff5_7fc1;
        }
        regs.pmsts |= WAK_STS;
        regs
    }
}
