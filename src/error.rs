//! Crate-level error type

use crate::clock::{ClockError, ClockSource, DivisorError};
use crate::gpio::GpioError;
use crate::mmio::BusAddress;
use crate::types::ParseError;

/// Carrier generator result
pub type Result<T> = core::result::Result<T, Error>;

/// Anything that can stop the carrier from starting or stopping cleanly
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad textual input
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Frequency cannot be synthesized
    #[error(transparent)]
    Divisor(#[from] DivisorError),

    /// Pin cannot carry a clock
    #[error(transparent)]
    Gpio(#[from] GpioError),

    /// Generator did not respond
    #[error(transparent)]
    Clock(#[from] ClockError),

    /// Source has no fixed rate and none was given
    #[error("clock source {0} has no known frequency, give it explicitly")]
    UnknownSourceFrequency(ClockSource),

    /// Peripheral window ends before a register we need
    #[error("peripheral window of {size:#x} bytes does not reach register {register}")]
    WindowTooSmall {
        /// Window size
        size: u64,
        /// First unreachable register
        register: BusAddress,
    },

    /// Peripheral window does not fit this platform's address types
    #[error("peripheral window {base:#x}+{size:#x} is not addressable")]
    WindowOutOfRange {
        /// Physical base
        base: u64,
        /// Size
        size: u64,
    },

    /// Operating system call failed
    #[cfg(feature = "std")]
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted
        context: &'static str,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}
