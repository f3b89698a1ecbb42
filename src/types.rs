//! Shared types used across the carrier generator
//!
//! This module defines domain-specific types that enforce invariants
//! at construction and provide type safety throughout the codebase.

use core::fmt;
use core::str::FromStr;

/// Error parsing a value from text (command line arguments)
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Input was empty
    #[error("empty value")]
    Empty,
    /// Input was not a number
    #[error("invalid number")]
    InvalidNumber,
    /// Unit suffix was not recognised
    #[error("unknown unit (expected Hz, k, M or G)")]
    UnknownUnit,
    /// Value does not fit the target type
    #[error("value out of range")]
    OutOfRange,
    /// Value was zero where a non-zero value is required
    #[error("value must be non-zero")]
    Zero,
    /// Name did not match any known variant
    #[error("unknown name")]
    UnknownName,
}

/// Frequency in Hertz
///
/// Always non-zero, so it can safely be used as a divisor.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frequency(u32);

impl Frequency {
    /// Create a new Frequency from Hz, returns None for 0 Hz
    #[must_use]
    pub const fn from_hz(hz: u32) -> Option<Self> {
        if hz == 0 {
            None
        } else {
            Some(Self(hz))
        }
    }

    /// Create a new Frequency from kHz
    #[must_use]
    pub const fn from_khz(khz: u32) -> Option<Self> {
        match khz.checked_mul(1_000) {
            Some(hz) => Self::from_hz(hz),
            None => None,
        }
    }

    /// Create a new Frequency from MHz
    #[must_use]
    pub const fn from_mhz(mhz: u32) -> Option<Self> {
        match mhz.checked_mul(1_000_000) {
            Some(hz) => Self::from_hz(hz),
            None => None,
        }
    }

    /// Get the frequency in Hz
    #[must_use]
    pub const fn as_hz(self) -> u32 {
        self.0
    }

    /// Get the frequency in kHz (truncated)
    #[must_use]
    pub const fn as_khz(self) -> u32 {
        self.0 / 1000
    }

    /// Signed difference `self - other` in Hz
    #[must_use]
    pub const fn offset_from(self, other: Self) -> i64 {
        self.0 as i64 - other.0 as i64
    }
}

impl fmt::Debug for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frequency({} Hz)", self.0)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 1_000_000 {
            write!(f, "{}.{:06} MHz", self.0 / 1_000_000, self.0 % 1_000_000)
        } else {
            write!(f, "{} Hz", self.0)
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Frequency {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} Hz", self.0);
    }
}

impl FromStr for Frequency {
    type Err = ParseError;

    /// Parse `104500000`, `104500000Hz`, `104.5M`, `104.5MHz` or `7074k`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        let number_len = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(number_len);

        let multiplier: u64 = match unit.trim_start() {
            "" | "Hz" | "hz" => 1,
            "k" | "K" | "kHz" | "khz" | "KHz" => 1_000,
            "M" | "m" | "MHz" | "mhz" | "Mhz" => 1_000_000,
            "G" | "g" | "GHz" | "ghz" | "Ghz" => 1_000_000_000,
            _ => return Err(ParseError::UnknownUnit),
        };

        let (whole, fraction) = match number.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (number, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(ParseError::InvalidNumber);
        }
        if fraction.contains('.') {
            return Err(ParseError::InvalidNumber);
        }

        let whole_value = if whole.is_empty() {
            0
        } else {
            whole.parse::<u64>().map_err(|_| ParseError::OutOfRange)?
        };
        let mut hz = whole_value
            .checked_mul(multiplier)
            .ok_or(ParseError::OutOfRange)?;

        // Fractional digits beyond 1 Hz resolution are truncated
        let mut scale = multiplier;
        for digit in fraction.bytes() {
            scale /= 10;
            if scale == 0 {
                break;
            }
            hz = hz.saturating_add(u64::from(digit - b'0') * scale);
        }

        let hz = u32::try_from(hz).map_err(|_| ParseError::OutOfRange)?;
        Self::from_hz(hz).ok_or(ParseError::Zero)
    }
}

/// BCM GPIO pin number (not the header pin number)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pin(u8);

impl Pin {
    /// Highest GPIO on the BCM2835 bank
    pub const MAX: u8 = 53;

    /// Pins handled by each function select register
    pub const PER_FSEL_REGISTER: u8 = 10;

    /// Create a pin, returns None above GPIO53
    #[must_use]
    pub const fn new(number: u8) -> Option<Self> {
        if number <= Self::MAX {
            Some(Self(number))
        } else {
            None
        }
    }

    /// BCM pin number
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Index of the GPFSELn register controlling this pin
    #[must_use]
    pub const fn fsel_index(self) -> usize {
        (self.0 / Self::PER_FSEL_REGISTER) as usize
    }

    /// Bit offset of this pin's 3-bit field inside its GPFSELn register
    #[must_use]
    pub const fn fsel_shift(self) -> u32 {
        3 * (self.0 % Self::PER_FSEL_REGISTER) as u32
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Pin {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "GPIO{}", self.0);
    }
}

impl FromStr for Pin {
    type Err = ParseError;

    /// Parse `4` or `GPIO4`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        let digits = s
            .strip_prefix("GPIO")
            .or_else(|| s.strip_prefix("gpio"))
            .unwrap_or(s);
        let number = digits.parse::<u8>().map_err(|_| ParseError::InvalidNumber)?;
        Self::new(number).ok_or(ParseError::OutOfRange)
    }
}
