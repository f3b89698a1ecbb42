//! System configuration and hardware constants
//!
//! This module defines compile-time defaults for the carrier generator.
//! Clock source rates, device paths and the default transmit setup are
//! centralized here; the CLI can override the runtime ones.

use crate::clock::{ClockSource, Mash};
use crate::gpio::Function;
use crate::types::{Frequency, Pin};

/// Default carrier frequency (104.5 MHz, FM broadcast band)
pub const DEFAULT_FREQUENCY_HZ: u32 = 104_500_000;

/// Default output pin (GPIO4, header pin 7, GPCLK0 on ALT0)
pub const DEFAULT_PIN: u8 = 4;

/// Default clock source
pub const DEFAULT_SOURCE: ClockSource = ClockSource::PllD;

/// Default noise-shaping filter (1-stage MASH supports fractional divisors)
pub const DEFAULT_MASH: Mash = Mash::OneStage;

/// Function a pin is returned to when the carrier stops
pub const RESTORE_FUNCTION: Function = Function::Output;

/// Crystal oscillator frequency (19.2 MHz)
pub const OSCILLATOR_FREQUENCY_HZ: u32 = 19_200_000;

/// PLLC per frequency (1 GHz, follows core clock scaling)
pub const PLLC_FREQUENCY_HZ: u32 = 1_000_000_000;

/// PLLD per frequency (500 MHz on BCM2835/6/7)
pub const PLLD_FREQUENCY_HZ: u32 = 500_000_000;

/// HDMI auxiliary clock frequency (216 MHz)
pub const HDMI_FREQUENCY_HZ: u32 = 216_000_000;

/// Highest clock a GPIO pad drives reliably (125 MHz at 1.2 V)
pub const GPIO_CLOCK_MAX_HZ: u32 = 125_000_000;

/// Maximum number of `BUSY` polls before giving up on a generator
pub const BUSY_SPIN_LIMIT: u32 = 100_000;

/// Physical memory device
pub const DEV_MEM_PATH: &str = "/dev/mem";

/// Device-tree property describing the peripheral window
pub const DT_RANGES_PATH: &str = "/proc/device-tree/soc/ranges";

/// Build the default carrier frequency
#[must_use]
pub const fn default_frequency() -> Option<Frequency> {
    Frequency::from_hz(DEFAULT_FREQUENCY_HZ)
}

/// Build the default output pin
#[must_use]
pub const fn default_pin() -> Option<Pin> {
    Pin::new(DEFAULT_PIN)
}
