//! GPIO Function Selection
//!
//! Each BCM GPIO has a 3-bit function field in one of the six `GPFSELn`
//! registers (ten pins per register). A few pins can route a general purpose
//! clock generator straight to the header through an alternate function.

use core::fmt;

use heapless::Vec;

use crate::clock::Gpclk;
use crate::mmio::Registers;
use crate::regs::{FSEL_MASK, GPFSEL};
use crate::types::Pin;

/// GPIO errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GpioError {
    /// The pin has no alternate function carrying a GPCLK output
    #[error("{pin} has no general purpose clock function")]
    NoClockFunction {
        /// Requested pin
        pin: Pin,
    },
}

/// Pin function, encoded as in the `GPFSELn` registers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    /// Input
    Input,
    /// Output
    Output,
    /// Alternate function 0
    Alt0,
    /// Alternate function 1
    Alt1,
    /// Alternate function 2
    Alt2,
    /// Alternate function 3
    Alt3,
    /// Alternate function 4
    Alt4,
    /// Alternate function 5
    Alt5,
}

impl Function {
    /// 3-bit function select code
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Input => 0b000,
            Self::Output => 0b001,
            Self::Alt0 => 0b100,
            Self::Alt1 => 0b101,
            Self::Alt2 => 0b110,
            Self::Alt3 => 0b111,
            Self::Alt4 => 0b011,
            Self::Alt5 => 0b010,
        }
    }

    /// Decode a 3-bit function select code (upper bits ignored)
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        match bits & FSEL_MASK {
            0b000 => Self::Input,
            0b001 => Self::Output,
            0b100 => Self::Alt0,
            0b101 => Self::Alt1,
            0b110 => Self::Alt2,
            0b111 => Self::Alt3,
            0b011 => Self::Alt4,
            _ => Self::Alt5,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "INPUT",
            Self::Output => "OUTPUT",
            Self::Alt0 => "ALT0",
            Self::Alt1 => "ALT1",
            Self::Alt2 => "ALT2",
            Self::Alt3 => "ALT3",
            Self::Alt4 => "ALT4",
            Self::Alt5 => "ALT5",
        };
        f.write_str(name)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Function {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=u32:03b}", self.bits());
    }
}

/// Select `function` for `pin`, leaving the other pins in the register untouched
pub fn set_function<R: Registers>(regs: &mut R, pin: Pin, function: Function) {
    let register = GPFSEL[pin.fsel_index()];
    let shift = pin.fsel_shift();
    regs.modify(register, |value| {
        (value & !(FSEL_MASK << shift)) | (function.bits() << shift)
    });
    log::debug!("{} -> {}", pin, function);
}

/// Current function of `pin`
pub fn function<R: Registers>(regs: &mut R, pin: Pin) -> Function {
    let value = regs.read(GPFSEL[pin.fsel_index()]);
    Function::from_bits(value >> pin.fsel_shift())
}

/// A pin/alternate function pair that outputs a clock generator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockRoute {
    /// GPIO carrying the clock
    pub pin: Pin,
    /// Alternate function that selects the clock
    pub function: Function,
    /// Clock generator driven out
    pub gpclk: Gpclk,
}

const fn route(number: u8, function: Function, gpclk: Gpclk) -> ClockRoute {
    let pin = match Pin::new(number) {
        Some(pin) => pin,
        None => panic!("clock route pin out of range"),
    };
    ClockRoute {
        pin,
        function,
        gpclk,
    }
}

/// All GPIO alternate functions carrying a GPCLK (BCM2835 datasheet table 6-31)
pub const CLOCK_ROUTES: [ClockRoute; 10] = [
    route(4, Function::Alt0, Gpclk::Gpclk0),
    route(5, Function::Alt0, Gpclk::Gpclk1),
    route(6, Function::Alt0, Gpclk::Gpclk2),
    route(20, Function::Alt5, Gpclk::Gpclk0),
    route(21, Function::Alt5, Gpclk::Gpclk1),
    route(32, Function::Alt0, Gpclk::Gpclk0),
    route(34, Function::Alt0, Gpclk::Gpclk0),
    route(42, Function::Alt0, Gpclk::Gpclk1),
    route(43, Function::Alt0, Gpclk::Gpclk2),
    route(44, Function::Alt0, Gpclk::Gpclk1),
];

/// Clock route for `pin`
pub fn clock_route(pin: Pin) -> Result<ClockRoute, GpioError> {
    CLOCK_ROUTES
        .iter()
        .find(|route| route.pin == pin)
        .copied()
        .ok_or(GpioError::NoClockFunction { pin })
}

/// Pins that can output `gpclk`
#[must_use]
pub fn clock_pins(gpclk: Gpclk) -> Vec<Pin, 4> {
    let mut pins = Vec::new();
    for route in CLOCK_ROUTES.iter().filter(|route| route.gpclk == gpclk) {
        let _ = pins.push(route.pin);
    }
    pins
}
