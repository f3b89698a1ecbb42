//! General Purpose Clock Generators
//!
//! The Clock Manager has three general purpose generators (GPCLK0..2). Each
//! divides a selectable source by a 12.12 fixed-point divisor, optionally
//! dithering the fractional part with a MASH noise shaper:
//!
//! ```text
//! source ──► [ DIVI.DIVF ] ──► MASH ──► GPCLKn ──► GPIO (ALTx)
//! ```

use core::fmt;
use core::str::FromStr;

use crate::config;
use crate::mmio::BusAddress;
use crate::regs::{cm, CM_GPCTL, CM_GPDIV};
use crate::types::{Frequency, ParseError};

pub mod divisor;
pub mod generator;

pub use divisor::{Divisor, DivisorError};
pub use generator::{start, status, stop, ClockError, ClockSettings, GeneratorStatus};

/// General purpose clock generator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gpclk {
    /// GPCLK0
    Gpclk0,
    /// GPCLK1
    Gpclk1,
    /// GPCLK2
    Gpclk2,
}

impl Gpclk {
    /// All generators
    pub const ALL: [Self; 3] = [Self::Gpclk0, Self::Gpclk1, Self::Gpclk2];

    /// Generator number
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Gpclk0 => 0,
            Self::Gpclk1 => 1,
            Self::Gpclk2 => 2,
        }
    }

    /// `CM_GPnCTL` register
    #[must_use]
    pub const fn control(self) -> BusAddress {
        CM_GPCTL[self.index()]
    }

    /// `CM_GPnDIV` register
    #[must_use]
    pub const fn divisor(self) -> BusAddress {
        CM_GPDIV[self.index()]
    }
}

impl fmt::Display for Gpclk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPCLK{}", self.index())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Gpclk {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Gpclk0 => defmt::write!(f, "GPCLK0"),
            Self::Gpclk1 => defmt::write!(f, "GPCLK1"),
            Self::Gpclk2 => defmt::write!(f, "GPCLK2"),
        }
    }
}

/// Clock generator source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClockSource {
    /// Ground (no clock)
    Ground,
    /// Crystal oscillator
    Oscillator,
    /// Test/debug mux 0
    TestDebug0,
    /// Test/debug mux 1
    TestDebug1,
    /// PLLA per
    PllA,
    /// PLLC per
    PllC,
    /// PLLD per
    #[default]
    PllD,
    /// HDMI auxiliary
    Hdmi,
}

impl ClockSource {
    /// `SRC` field value
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Ground => 0,
            Self::Oscillator => 1,
            Self::TestDebug0 => 2,
            Self::TestDebug1 => 3,
            Self::PllA => 4,
            Self::PllC => 5,
            Self::PllD => 6,
            Self::Hdmi => 7,
        }
    }

    /// Decode the `SRC` field; codes 8..=15 are ground
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        match bits & cm::SRC_MASK {
            1 => Self::Oscillator,
            2 => Self::TestDebug0,
            3 => Self::TestDebug1,
            4 => Self::PllA,
            5 => Self::PllC,
            6 => Self::PllD,
            7 => Self::Hdmi,
            _ => Self::Ground,
        }
    }

    /// Frequency the firmware normally runs this source at
    ///
    /// None for sources without a fixed rate (ground, test/debug, PLLA).
    /// PLLC follows the core clock, so its figure is only nominal.
    #[must_use]
    pub const fn nominal_frequency(self) -> Option<Frequency> {
        match self {
            Self::Oscillator => Frequency::from_hz(config::OSCILLATOR_FREQUENCY_HZ),
            Self::PllC => Frequency::from_hz(config::PLLC_FREQUENCY_HZ),
            Self::PllD => Frequency::from_hz(config::PLLD_FREQUENCY_HZ),
            Self::Hdmi => Frequency::from_hz(config::HDMI_FREQUENCY_HZ),
            Self::Ground | Self::TestDebug0 | Self::TestDebug1 | Self::PllA => None,
        }
    }
}

impl fmt::Display for ClockSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ground => "gnd",
            Self::Oscillator => "osc",
            Self::TestDebug0 => "testdebug0",
            Self::TestDebug1 => "testdebug1",
            Self::PllA => "plla",
            Self::PllC => "pllc",
            Self::PllD => "plld",
            Self::Hdmi => "hdmi",
        };
        f.write_str(name)
    }
}

impl FromStr for ClockSource {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let source = if s.eq_ignore_ascii_case("gnd") || s.eq_ignore_ascii_case("ground") {
            Self::Ground
        } else if s.eq_ignore_ascii_case("osc") || s.eq_ignore_ascii_case("oscillator") {
            Self::Oscillator
        } else if s.eq_ignore_ascii_case("testdebug0") {
            Self::TestDebug0
        } else if s.eq_ignore_ascii_case("testdebug1") {
            Self::TestDebug1
        } else if s.eq_ignore_ascii_case("plla") {
            Self::PllA
        } else if s.eq_ignore_ascii_case("pllc") {
            Self::PllC
        } else if s.eq_ignore_ascii_case("plld") {
            Self::PllD
        } else if s.eq_ignore_ascii_case("hdmi") {
            Self::Hdmi
        } else {
            return Err(ParseError::UnknownName);
        };
        Ok(source)
    }
}

/// MASH noise-shaping filter order
///
/// Higher orders push the fractional divider's jitter to higher frequencies
/// but spread the instantaneous output over a wider range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mash {
    /// Integer division, fraction ignored
    Integer,
    /// 1-stage MASH (equivalent to non-MASH dividers)
    #[default]
    OneStage,
    /// 2-stage MASH
    TwoStage,
    /// 3-stage MASH
    ThreeStage,
}

impl Mash {
    /// Filter order (0-3)
    #[must_use]
    pub const fn order(self) -> u32 {
        match self {
            Self::Integer => 0,
            Self::OneStage => 1,
            Self::TwoStage => 2,
            Self::ThreeStage => 3,
        }
    }

    /// `MASH` field of the control register
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.order() << cm::MASH_SHIFT
    }

    /// Decode the `MASH` field of a control register value
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        match (bits & cm::MASH_MASK) >> cm::MASH_SHIFT {
            0 => Self::Integer,
            1 => Self::OneStage,
            2 => Self::TwoStage,
            _ => Self::ThreeStage,
        }
    }

    /// Smallest `DIVI` the filter supports
    #[must_use]
    pub const fn min_divi(self) -> u32 {
        match self {
            Self::Integer => 1,
            Self::OneStage => 2,
            Self::TwoStage => 3,
            Self::ThreeStage => 5,
        }
    }

    /// How far below/above `DIVI` the instantaneous divider reaches
    ///
    /// Returns `(add, sub)`: the divider swings over `DIVI - sub ..= DIVI + add`.
    #[must_use]
    pub const fn divider_swing(self) -> (u32, u32) {
        match self {
            Self::Integer => (0, 0),
            Self::OneStage => (1, 0),
            Self::TwoStage => (2, 1),
            Self::ThreeStage => (4, 3),
        }
    }
}

impl fmt::Display for Mash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            _ => write!(f, "{}-stage MASH", self.order()),
        }
    }
}

impl FromStr for Mash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" | "int" | "integer" => Ok(Self::Integer),
            "1" => Ok(Self::OneStage),
            "2" => Ok(Self::TwoStage),
            "3" => Ok(Self::ThreeStage),
            "" => Err(ParseError::Empty),
            _ => Err(ParseError::UnknownName),
        }
    }
}
