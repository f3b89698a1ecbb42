//! Simulated Peripheral Registers
//!
//! A small in-memory model of the registers the carrier touches. It behaves
//! like the Clock Manager where that matters to the programming protocol:
//!
//! - writes to `CM_GPnCTL`/`CM_GPnDIV` without the `0x5A` password are dropped
//! - the password field reads back as zero
//! - `BUSY` is read-only and follows `ENAB` after a number of reads
//!
//! Every write is recorded, in order, for inspection. A write that does not
//! fit the log or the register bank sets [`SimulatedRegisters::overflowed`].

use heapless::{LinearMap, Vec};

use super::{BusAddress, Registers};
use crate::regs::{cm, CM_GPCTL, CM_GPDIV};

/// Number of writes the simulator records before dropping new entries
pub const WRITE_LOG_CAPACITY: usize = 64;

/// Number of distinct registers the simulator can hold
const REGISTER_CAPACITY: usize = 16;

/// One recorded register write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterWrite {
    /// Register written
    pub address: BusAddress,
    /// Value written, password included
    pub value: u32,
}

#[derive(Clone, Copy, Debug)]
struct Settle {
    remaining: u16,
    busy: bool,
}

/// In-memory register bank with Clock Manager behaviour
#[derive(Clone, Debug, Default)]
pub struct SimulatedRegisters {
    values: LinearMap<BusAddress, u32, REGISTER_CAPACITY>,
    pending: LinearMap<BusAddress, Settle, 3>,
    writes: Vec<RegisterWrite, WRITE_LOG_CAPACITY>,
    busy_latency: u16,
    stuck_busy: bool,
    overflowed: bool,
}

impl SimulatedRegisters {
    /// Create a register bank where `BUSY` follows `ENAB` immediately
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `BUSY` follows `ENAB` only after `reads` reads of the control register
    #[must_use]
    pub fn with_busy_latency(reads: u16) -> Self {
        Self {
            busy_latency: reads,
            ..Self::default()
        }
    }

    /// `BUSY` never changes, so generator start/stop cannot complete
    #[must_use]
    pub fn with_stuck_busy() -> Self {
        Self {
            stuck_busy: true,
            ..Self::default()
        }
    }

    /// Set a register's value directly (power-on state), bypassing the write log
    pub fn preset(&mut self, address: BusAddress, value: u32) {
        self.store(address, value);
    }

    /// Current value of a register without side effects
    #[must_use]
    pub fn peek(&self, address: BusAddress) -> u32 {
        self.values.get(&address).copied().unwrap_or(0)
    }

    /// All recorded writes, oldest first
    #[must_use]
    pub fn writes(&self) -> &[RegisterWrite] {
        &self.writes
    }

    /// Forget recorded writes
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Whether a write was lost because the log or the register bank was full
    #[must_use]
    pub const fn overflowed(&self) -> bool {
        self.overflowed
    }

    fn store(&mut self, address: BusAddress, value: u32) {
        if self.values.insert(address, value).is_err() {
            if !self.overflowed {
                log::warn!("simulated register bank full, {} not stored", address);
            }
            self.overflowed = true;
        }
    }

    fn record(&mut self, write: RegisterWrite) {
        if self.writes.push(write).is_err() {
            // Warn once; a stuck generator retries thousands of times
            if !self.overflowed {
                log::warn!("simulated write log full after {} writes", WRITE_LOG_CAPACITY);
            }
            self.overflowed = true;
        }
    }

    fn is_clock_control(address: BusAddress) -> bool {
        CM_GPCTL.contains(&address)
    }

    fn is_clock_manager(address: BusAddress) -> bool {
        Self::is_clock_control(address) || CM_GPDIV.contains(&address)
    }

    fn set_busy(&mut self, address: BusAddress, busy: bool) {
        let value = self.peek(address) & !cm::BUSY;
        let value = if busy { value | cm::BUSY } else { value };
        self.store(address, value);
    }

    fn write_control(&mut self, address: BusAddress, value: u32) {
        let busy_now = self.peek(address) & cm::BUSY != 0;
        let busy_bit = if busy_now { cm::BUSY } else { 0 };
        self.store(address, (value & !cm::BUSY) | busy_bit);

        if self.stuck_busy {
            return;
        }

        let target = value & cm::ENAB != 0;
        match self.pending.get(&address) {
            Some(settle) if settle.busy == target => {}
            _ if target == busy_now => {
                self.pending.remove(&address);
            }
            _ if self.busy_latency == 0 => {
                self.pending.remove(&address);
                self.set_busy(address, target);
            }
            _ => {
                // One slot per CM_GPnCTL, so this cannot fail
                let _ = self.pending.insert(
                    address,
                    Settle {
                        remaining: self.busy_latency,
                        busy: target,
                    },
                );
            }
        }
    }
}

impl Registers for SimulatedRegisters {
    fn read(&mut self, address: BusAddress) -> u32 {
        if let Some(settle) = self.pending.get_mut(&address) {
            settle.remaining = settle.remaining.saturating_sub(1);
            if settle.remaining == 0 {
                let busy = settle.busy;
                self.pending.remove(&address);
                self.set_busy(address, busy);
            }
        }
        self.peek(address)
    }

    fn write(&mut self, address: BusAddress, value: u32) {
        self.record(RegisterWrite { address, value });

        if !Self::is_clock_manager(address) {
            self.store(address, value);
            return;
        }

        if value & cm::PASSWD_MASK != cm::PASSWD {
            log::trace!("dropped clock manager write without password to {}", address);
            return;
        }

        let value = value & !cm::PASSWD_MASK;
        if Self::is_clock_control(address) {
            self.write_control(address, value);
        } else {
            self.store(address, value);
        }
    }
}
