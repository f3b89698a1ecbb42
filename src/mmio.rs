//! Memory-Mapped Register Access
//!
//! Everything above this layer talks to hardware through [`Registers`], so
//! the clock and GPIO protocols run unchanged against the real `/dev/mem`
//! mapping or against [`SimulatedRegisters`] on the host.

use core::fmt;

use crate::regs::PERIPHERAL_BUS_BASE;

mod sim;

#[cfg(feature = "rpi")]
mod devmem;

pub use sim::{RegisterWrite, SimulatedRegisters, WRITE_LOG_CAPACITY};

#[cfg(feature = "rpi")]
pub use devmem::PeripheralMap;

/// VideoCore bus address of a peripheral register (`0x7Exx_xxxx`)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BusAddress(u32);

impl BusAddress {
    /// Wrap a raw bus address
    #[must_use]
    pub const fn new(address: u32) -> Self {
        Self(address)
    }

    /// Raw bus address
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Byte offset from the start of the peripheral window
    ///
    /// Returns None for addresses below the peripheral bus base.
    #[must_use]
    pub const fn offset(self) -> Option<usize> {
        match self.0.checked_sub(PERIPHERAL_BUS_BASE) {
            Some(offset) => Some(offset as usize),
            None => None,
        }
    }
}

impl fmt::Debug for BusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BusAddress({:#010X})", self.0)
    }
}

impl fmt::Display for BusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BusAddress {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=u32:#010X}", self.0);
    }
}

/// 32-bit peripheral register access
pub trait Registers {
    /// Read a register
    fn read(&mut self, address: BusAddress) -> u32;

    /// Write a register
    fn write(&mut self, address: BusAddress, value: u32);

    /// Read-modify-write a register
    fn modify<F>(&mut self, address: BusAddress, f: F)
    where
        F: FnOnce(u32) -> u32,
        Self: Sized,
    {
        let value = self.read(address);
        self.write(address, f(value));
    }
}

impl<R: Registers + ?Sized> Registers for &mut R {
    fn read(&mut self, address: BusAddress) -> u32 {
        (**self).read(address)
    }

    fn write(&mut self, address: BusAddress, value: u32) {
        (**self).write(address, value);
    }
}
