//! `/dev/mem` Peripheral Mapping
//!
//! Maps the SoC peripheral window into this process so registers can be
//! accessed with volatile loads and stores. Requires root.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::fs::{File, OpenOptions};
use std::io;
use std::num::NonZeroUsize;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::ptr::{self, NonNull};

use nix::fcntl::OFlag;
use nix::sys::mman::munmap;

use super::{BusAddress, Registers};
use crate::regs;
use crate::soc::PeripheralWindow;
use crate::{Error, Result};

/// Peripheral register window mapped from the physical memory device
///
/// # Panics
///
/// [`Registers::read`] and [`Registers::write`] panic for a register that
/// is unaligned or lies outside the mapped window. Every register in
/// [`crate::regs`] is inside any window accepted by [`PeripheralMap::open`].
#[derive(Debug)]
pub struct PeripheralMap {
    base: NonNull<c_void>,
    len: usize,
    window: PeripheralWindow,
}

impl PeripheralMap {
    /// Open `device` (normally `/dev/mem`) and map `window` read/write, shared
    ///
    /// The file descriptor is closed once the mapping exists.
    pub fn open(device: &Path, window: PeripheralWindow) -> Result<Self> {
        if !window.covers(regs::HIGHEST) {
            return Err(Error::WindowTooSmall {
                size: window.size,
                register: regs::HIGHEST,
            });
        }

        let len = usize::try_from(window.size)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(Error::WindowOutOfRange {
                base: window.base,
                size: window.size,
            })?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(OFlag::O_SYNC.bits())
            .open(device)
            .map_err(|source| Error::Io {
                context: "can't open memory device (run as root)",
                source,
            })?;

        let base = map_shared(&file, len, window)?;
        log::debug!(
            "mapped {} bytes of {} at {:p}",
            len,
            device.display(),
            base
        );

        Ok(Self {
            base,
            len: len.get(),
            window,
        })
    }

    /// Physical window backing this mapping
    #[must_use]
    pub const fn window(&self) -> PeripheralWindow {
        self.window
    }

    fn register(&self, address: BusAddress) -> *mut u32 {
        let Some(offset) = register_offset(address, self.len) else {
            panic!("register {address} outside mapped peripheral window");
        };
        // SAFETY: offset + 4 <= len, so the pointer stays inside the mapping,
        // and both the page-aligned base and the offset are 4-byte aligned.
        unsafe { self.base.as_ptr().cast::<u8>().add(offset).cast::<u32>() }
    }
}

/// Byte offset of `address` in a mapping of `len` bytes, if aligned and in bounds
fn register_offset(address: BusAddress, len: usize) -> Option<usize> {
    address
        .offset()
        .filter(|offset| offset % 4 == 0 && offset.checked_add(4).is_some_and(|end| end <= len))
}

fn map_failed(source: nix::Error) -> Error {
    Error::Io {
        context: "failed to map peripheral memory",
        source: io::Error::from(source),
    }
}

/// Shared read/write mapping of `window` from `file`
#[cfg(target_pointer_width = "64")]
fn map_shared(file: &File, len: NonZeroUsize, window: PeripheralWindow) -> Result<NonNull<c_void>> {
    use nix::sys::mman::{mmap, MapFlags, ProtFlags};

    let offset = libc::off_t::try_from(window.base).map_err(|_| Error::WindowOutOfRange {
        base: window.base,
        size: window.size,
    })?;
    // SAFETY: a fresh shared mapping at a kernel-chosen address; no existing
    // Rust memory is aliased.
    unsafe {
        mmap(
            None,
            len,
            ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
            MapFlags::MAP_SHARED,
            file,
            offset,
        )
    }
    .map_err(map_failed)
}

/// Shared read/write mapping of `window` from `file`
///
/// 32-bit `off_t` cannot hold the Pi 4 base (`0xFE00_0000`), so this goes
/// through `mmap64` directly.
#[cfg(not(target_pointer_width = "64"))]
fn map_shared(file: &File, len: NonZeroUsize, window: PeripheralWindow) -> Result<NonNull<c_void>> {
    use std::os::unix::io::AsRawFd;

    use nix::errno::Errno;

    let offset = libc::off64_t::try_from(window.base).map_err(|_| Error::WindowOutOfRange {
        base: window.base,
        size: window.size,
    })?;
    // SAFETY: as above; MAP_FAILED is turned into an error by Errno::result.
    let addr = Errno::result(unsafe {
        libc::mmap64(
            ptr::null_mut(),
            len.get(),
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            file.as_raw_fd(),
            offset,
        )
    })
    .map_err(map_failed)?;
    NonNull::new(addr).ok_or_else(|| map_failed(nix::Error::EADDRNOTAVAIL))
}

impl Registers for PeripheralMap {
    /// # Panics
    ///
    /// If `address` is unaligned or outside the mapped window.
    fn read(&mut self, address: BusAddress) -> u32 {
        // SAFETY: in-bounds, aligned pointer into device memory
        unsafe { ptr::read_volatile(self.register(address)) }
    }

    /// # Panics
    ///
    /// If `address` is unaligned or outside the mapped window.
    fn write(&mut self, address: BusAddress, value: u32) {
        // SAFETY: in-bounds, aligned pointer into device memory
        unsafe { ptr::write_volatile(self.register(address), value) }
    }
}

impl Drop for PeripheralMap {
    fn drop(&mut self) {
        // SAFETY: base/len describe the mapping created in `open`, and no
        // register pointers outlive `self`.
        if let Err(err) = unsafe { munmap(self.base, self.len) } {
            log::warn!("munmap failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_inside_window() {
        assert_eq!(register_offset(regs::GPFSEL[0], 0x0100_0000), Some(0x20_0000));
        assert_eq!(register_offset(regs::HIGHEST, 0x20_0018), Some(0x20_0014));
    }

    #[test]
    fn offsets_outside_window() {
        assert_eq!(register_offset(regs::HIGHEST, 0x20_0017), None);
        assert_eq!(register_offset(BusAddress::new(0x3F20_0000), 0x0100_0000), None);
    }

    #[test]
    fn unaligned_offset_rejected() {
        assert_eq!(register_offset(BusAddress::new(0x7E20_0002), 0x0100_0000), None);
    }
}
