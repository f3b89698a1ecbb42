//! BCM283x register map
//!
//! Addresses are VideoCore bus addresses as printed in the BCM2835 ARM
//! Peripherals datasheet (`0x7Exx_xxxx`). They are translated to offsets in
//! the mapped peripheral window by [`crate::mmio::BusAddress::offset`].

use crate::mmio::BusAddress;

/// Bus address where the peripheral register space begins
pub const PERIPHERAL_BUS_BASE: u32 = 0x7E00_0000;

/// GPIO function select registers `GPFSEL0..=GPFSEL5`
pub const GPFSEL: [BusAddress; 6] = [
    BusAddress::new(0x7E20_0000),
    BusAddress::new(0x7E20_0004),
    BusAddress::new(0x7E20_0008),
    BusAddress::new(0x7E20_000C),
    BusAddress::new(0x7E20_0010),
    BusAddress::new(0x7E20_0014),
];

/// Clock Manager general purpose clock control registers `CM_GP0CTL..=CM_GP2CTL`
pub const CM_GPCTL: [BusAddress; 3] = [
    BusAddress::new(0x7E10_1070),
    BusAddress::new(0x7E10_1078),
    BusAddress::new(0x7E10_1080),
];

/// Clock Manager general purpose clock divisor registers `CM_GP0DIV..=CM_GP2DIV`
pub const CM_GPDIV: [BusAddress; 3] = [
    BusAddress::new(0x7E10_1074),
    BusAddress::new(0x7E10_107C),
    BusAddress::new(0x7E10_1084),
];

/// Highest register this crate touches; the mapped window must cover it
pub const HIGHEST: BusAddress = GPFSEL[5];

/// Datasheet name of a register this crate touches
#[must_use]
pub fn name(address: BusAddress) -> Option<&'static str> {
    const FSEL_NAMES: [&str; 6] = ["GPFSEL0", "GPFSEL1", "GPFSEL2", "GPFSEL3", "GPFSEL4", "GPFSEL5"];
    const CTL_NAMES: [&str; 3] = ["CM_GP0CTL", "CM_GP1CTL", "CM_GP2CTL"];
    const DIV_NAMES: [&str; 3] = ["CM_GP0DIV", "CM_GP1DIV", "CM_GP2DIV"];

    let lookup = |registers: &[BusAddress], names: &[&'static str]| {
        registers
            .iter()
            .position(|register| *register == address)
            .map(|index| names[index])
    };
    lookup(&GPFSEL, &FSEL_NAMES)
        .or_else(|| lookup(&CM_GPCTL, &CTL_NAMES))
        .or_else(|| lookup(&CM_GPDIV, &DIV_NAMES))
}

/// Clock Manager control/divisor register fields
pub mod cm {
    /// Password required in bits 31..24 of every Clock Manager write
    pub const PASSWD: u32 = 0x5A << 24;
    /// Password field mask
    pub const PASSWD_MASK: u32 = 0xFF << 24;
    /// Enable the clock generator
    pub const ENAB: u32 = 1 << 4;
    /// Kill the generator (glitches the output, debug only)
    pub const KILL: u32 = 1 << 5;
    /// Generator is running
    pub const BUSY: u32 = 1 << 7;
    /// Invert the generator output
    pub const FLIP: u32 = 1 << 8;
    /// MASH filter field shift
    pub const MASH_SHIFT: u32 = 9;
    /// MASH filter field mask
    pub const MASH_MASK: u32 = 0b11 << MASH_SHIFT;
    /// Clock source field mask
    pub const SRC_MASK: u32 = 0xF;

    /// Integer part of the divisor, bits 23..12
    pub const DIVI_SHIFT: u32 = 12;
    /// Divisor integer field mask
    pub const DIVI_MASK: u32 = 0xFFF << DIVI_SHIFT;
    /// Fractional part of the divisor, bits 11..0
    pub const DIVF_MASK: u32 = 0xFFF;
}

/// GPIO function select field width in bits
pub const FSEL_BITS: u32 = 3;

/// GPIO function select field mask (before shifting)
pub const FSEL_MASK: u32 = 0b111;
