//! Peripheral Window Discovery
//!
//! The physical address of the peripheral block differs between boards
//! (`0x2000_0000` on the Pi 1, `0x3F00_0000` on the Pi 2/3, `0xFE00_0000` on
//! the Pi 4). The kernel publishes it in the device tree as the first entry
//! of `/soc/ranges`:
//!
//! ```text
//! Pi 3:  <0x7e000000  0x3f000000  0x01000000>       child, parent, size
//! Pi 4:  <0x7e000000  0x0 0xfe000000  0x01800000>   child, parent (2 cells), size
//! ```
//!
//! All cells are big-endian `u32`.

use crate::mmio::BusAddress;

/// Physical location and size of the peripheral register block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeripheralWindow {
    /// Physical base address
    pub base: u64,
    /// Window size in bytes
    pub size: u64,
}

impl PeripheralWindow {
    /// Size assumed when only a base address is known
    pub const DEFAULT_SIZE: u64 = 0x0100_0000;

    /// First-generation Raspberry Pi (BCM2835) window, used when discovery fails
    pub const LEGACY: Self = Self::new(0x2000_0000, Self::DEFAULT_SIZE);

    /// Create a window from a physical base and size
    #[must_use]
    pub const fn new(base: u64, size: u64) -> Self {
        Self { base, size }
    }

    /// Window at `base` with the default size
    #[must_use]
    pub const fn at(base: u64) -> Self {
        Self::new(base, Self::DEFAULT_SIZE)
    }

    /// Parse the first entry of a device-tree `soc/ranges` property
    ///
    /// Returns None if the blob is too short or describes an empty window.
    #[must_use]
    pub fn from_ranges(ranges: &[u8]) -> Option<Self> {
        let base = read_be_u32(ranges, 4)?;
        let (base, size) = if base == 0 {
            (read_be_u32(ranges, 8)?, read_be_u32(ranges, 12)?)
        } else {
            (base, read_be_u32(ranges, 8)?)
        };
        if size == 0 {
            return None;
        }
        Some(Self::new(u64::from(base), u64::from(size)))
    }

    /// Read the window from the device tree at `path`
    ///
    /// Falls back to [`PeripheralWindow::LEGACY`] when the file is missing or
    /// malformed, which is what the board support library did on old kernels.
    #[cfg(feature = "std")]
    #[must_use]
    pub fn discover(path: &std::path::Path) -> Self {
        match std::fs::read(path) {
            Ok(ranges) => Self::from_ranges(&ranges).unwrap_or_else(|| {
                log::warn!(
                    "malformed {}, assuming peripherals at {:#x}",
                    path.display(),
                    Self::LEGACY.base
                );
                Self::LEGACY
            }),
            Err(err) => {
                log::warn!(
                    "can't read {} ({}), assuming peripherals at {:#x}",
                    path.display(),
                    err,
                    Self::LEGACY.base
                );
                Self::LEGACY
            }
        }
    }

    /// Whether the 32-bit register at `address` lies inside the window
    #[must_use]
    pub fn covers(&self, address: BusAddress) -> bool {
        address
            .offset()
            .is_some_and(|offset| offset as u64 + 4 <= self.size)
    }
}

fn read_be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let cell = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([cell[0], cell[1], cell[2], cell[3]]))
}
