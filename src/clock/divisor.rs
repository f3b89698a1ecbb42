//! Clock Divisor Calculation
//!
//! The generator output is `f_out = f_source / (DIVI + DIVF / 4096)`, with
//! `DIVI` and `DIVF` packed into the low 24 bits of `CM_GPnDIV`. The packed
//! value is exactly `f_source / f_target * 4096`, i.e. an unsigned 12.12
//! fixed-point number. This module is testable on the host.
//!
//! The datasheet's own worked formula divides by 1024; the hardware uses
//! the full 12-bit fraction.

use core::fmt;

use fixed::types::U20F12;

use super::Mash;
use crate::regs::cm;
use crate::types::Frequency;

/// Divisor calculation errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DivisorError {
    /// Target needs a divisor above 4095
    #[error("{target} is below the lowest reachable frequency of {minimum_hz} Hz")]
    TooLow {
        /// Requested frequency
        target: Frequency,
        /// Lowest reachable frequency in Hz
        minimum_hz: u32,
    },
    /// Target needs a divisor below the MASH filter's minimum
    #[error("{target} is above the highest frequency of {maximum_hz} Hz reachable with {mash}")]
    TooHigh {
        /// Requested frequency
        target: Frequency,
        /// Highest reachable frequency in Hz
        maximum_hz: u32,
        /// Filter that imposed the limit
        mash: Mash,
    },
}

/// 12.12 fixed-point clock divisor (`DIVI.DIVF`)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Divisor(U20F12);

impl Divisor {
    /// Largest integer part (`DIVI` is 12 bits)
    pub const MAX_INTEGER: u32 = 0xFFF;

    /// Fractional resolution (`DIVF` is 12 bits)
    pub const FRACTION_STEPS: u32 = 1 << cm::DIVI_SHIFT;

    /// Divisor producing `target` from `source` with the given filter
    ///
    /// Computed as `floor(source * 4096 / target)` with exact integer
    /// arithmetic. Integer mode drops the fraction.
    pub fn for_frequency(
        source: Frequency,
        target: Frequency,
        mash: Mash,
    ) -> Result<Self, DivisorError> {
        let source_hz = u64::from(source.as_hz());
        let mut bits = (source_hz << cm::DIVI_SHIFT) / u64::from(target.as_hz());
        if mash == Mash::Integer {
            bits &= !u64::from(cm::DIVF_MASK);
        }

        let integer = bits >> cm::DIVI_SHIFT;
        if integer > u64::from(Self::MAX_INTEGER) {
            return Err(DivisorError::TooLow {
                target,
                minimum_hz: source.as_hz() / Self::FRACTION_STEPS + 1,
            });
        }
        if integer < u64::from(mash.min_divi()) {
            return Err(DivisorError::TooHigh {
                target,
                maximum_hz: source.as_hz() / mash.min_divi(),
                mash,
            });
        }

        // integer <= 0xFFF, so bits < 2^24
        #[allow(clippy::cast_possible_truncation)]
        let bits = bits as u32;
        Ok(Self(U20F12::from_bits(bits)))
    }

    /// Decode the `DIVI`/`DIVF` fields of a `CM_GPnDIV` value
    #[must_use]
    pub const fn from_register(value: u32) -> Self {
        Self(U20F12::from_bits(value & (cm::DIVI_MASK | cm::DIVF_MASK)))
    }

    /// Value for `CM_GPnDIV`, without the password
    #[must_use]
    pub const fn to_register(self) -> u32 {
        self.0.to_bits()
    }

    /// Fixed-point divisor value
    #[must_use]
    pub const fn value(self) -> U20F12 {
        self.0
    }

    /// `DIVI`
    #[must_use]
    pub fn integer(self) -> u32 {
        self.0.int().to_num()
    }

    /// `DIVF`, in 1/4096 steps
    #[must_use]
    pub fn fraction(self) -> u32 {
        self.0.frac().to_bits()
    }

    /// Average output frequency for `source`, rounded to the nearest Hz
    ///
    /// Returns None for a zero divisor.
    #[must_use]
    pub fn output_frequency(self, source: Frequency) -> Option<Frequency> {
        let bits = u64::from(self.0.to_bits());
        if bits == 0 {
            return None;
        }
        let scaled = u64::from(source.as_hz()) << cm::DIVI_SHIFT;
        let hz = (scaled + bits / 2) / bits;
        u32::try_from(hz).ok().and_then(Frequency::from_hz)
    }

    /// Lowest and highest instantaneous output frequency (datasheet table 6-32)
    ///
    /// The MASH filter toggles the divider between neighbouring integers, so
    /// the output edges wander around the average frequency.
    #[must_use]
    pub fn frequency_span(self, source: Frequency, mash: Mash) -> (u32, u32) {
        let (add, sub) = mash.divider_swing();
        let divi = self.integer();
        let min = source.as_hz() / (divi + add).max(1);
        let max = source.as_hz() / divi.saturating_sub(sub).max(1);
        (min, max)
    }
}

impl fmt::Debug for Divisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Divisor(DIVI={}, DIVF={})",
            self.integer(),
            self.fraction()
        )
    }
}

impl fmt::Display for Divisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
