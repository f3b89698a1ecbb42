//! Clock Manager Programming Sequence
//!
//! Changing a running generator glitches its output and can lock it up, so
//! the datasheet prescribes a fixed order:
//!
//! 1. clear `ENAB` and wait for `BUSY` to drop
//! 2. write the divisor
//! 3. write source and MASH with `ENAB` still clear
//! 4. set `ENAB` and wait for `BUSY` to rise
//!
//! Every write carries the `0x5A` password in bits 31..24 or the hardware
//! ignores it. The busy waits are bounded by [`BUSY_SPIN_LIMIT`].

use super::{ClockSource, Divisor, Gpclk, Mash};
use crate::config::BUSY_SPIN_LIMIT;
use crate::mmio::Registers;
use crate::regs::cm;

/// Clock Manager errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// `BUSY` never cleared after disabling the generator
    #[error("{gpclk} did not stop (BUSY stayed set)")]
    StopTimeout {
        /// Generator
        gpclk: Gpclk,
    },
    /// `BUSY` never set after enabling the generator
    #[error("{gpclk} did not start (BUSY stayed clear)")]
    StartTimeout {
        /// Generator
        gpclk: Gpclk,
    },
}

/// What to program into a generator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockSettings {
    /// Source clock
    pub source: ClockSource,
    /// Noise-shaping filter
    pub mash: Mash,
    /// Divisor
    pub divisor: Divisor,
}

/// Decoded generator registers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorStatus {
    /// `ENAB` is set
    pub enabled: bool,
    /// `BUSY` is set (generator running)
    pub busy: bool,
    /// Selected source
    pub source: ClockSource,
    /// Selected filter
    pub mash: Mash,
    /// Current divisor
    pub divisor: Divisor,
}

fn is_busy<R: Registers>(regs: &mut R, gpclk: Gpclk) -> bool {
    regs.read(gpclk.control()) & cm::BUSY != 0
}

/// Poll `BUSY` until it equals `busy`, calling `poke` between polls
fn wait_busy<R, F>(regs: &mut R, gpclk: Gpclk, busy: bool, mut poke: F) -> bool
where
    R: Registers,
    F: FnMut(&mut R),
{
    for _ in 0..BUSY_SPIN_LIMIT {
        if is_busy(regs, gpclk) == busy {
            return true;
        }
        poke(regs);
    }
    is_busy(regs, gpclk) == busy
}

/// Disable `gpclk`, keeping `source` selected, and wait until it has stopped
pub fn stop<R: Registers>(regs: &mut R, gpclk: Gpclk, source: ClockSource) -> Result<(), ClockError> {
    let control = gpclk.control();
    let stopped = wait_busy(regs, gpclk, false, |regs| {
        regs.write(control, cm::PASSWD | source.bits());
    });
    if !stopped {
        log::error!("{} stuck busy", gpclk);
        return Err(ClockError::StopTimeout { gpclk });
    }
    log::debug!("{} stopped", gpclk);
    Ok(())
}

/// Program and enable `gpclk`
pub fn start<R: Registers>(regs: &mut R, gpclk: Gpclk, settings: &ClockSettings) -> Result<(), ClockError> {
    stop(regs, gpclk, settings.source)?;

    let control = gpclk.control();
    regs.write(gpclk.divisor(), cm::PASSWD | settings.divisor.to_register());
    log::debug!("{} divisor {:?}", gpclk, settings.divisor);
    regs.write(control, cm::PASSWD | settings.mash.bits() | settings.source.bits());
    log::debug!("{} source {}, {}", gpclk, settings.source, settings.mash);

    let started = wait_busy(regs, gpclk, true, |regs| {
        let current = regs.read(control) & !(cm::PASSWD_MASK | cm::BUSY);
        regs.write(control, cm::PASSWD | current | cm::ENAB);
    });
    if !started {
        log::error!("{} failed to start", gpclk);
        return Err(ClockError::StartTimeout { gpclk });
    }
    log::debug!("{} running", gpclk);
    Ok(())
}

/// Read back the generator's control and divisor registers
pub fn status<R: Registers>(regs: &mut R, gpclk: Gpclk) -> GeneratorStatus {
    let control = regs.read(gpclk.control());
    let divisor = regs.read(gpclk.divisor());
    GeneratorStatus {
        enabled: control & cm::ENAB != 0,
        busy: control & cm::BUSY != 0,
        source: ClockSource::from_bits(control),
        mash: Mash::from_bits(control),
        divisor: Divisor::from_register(divisor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmio::SimulatedRegisters;

    #[test]
    fn stop_idle_generator_writes_nothing() {
        let mut regs = SimulatedRegisters::new();
        stop(&mut regs, Gpclk::Gpclk0, ClockSource::PllD).unwrap();
        assert!(regs.writes().is_empty());
    }

    #[test]
    fn stuck_generator_times_out() {
        let mut regs = SimulatedRegisters::with_stuck_busy();
        regs.preset(Gpclk::Gpclk1.control(), cm::ENAB | cm::BUSY);
        assert_eq!(
            stop(&mut regs, Gpclk::Gpclk1, ClockSource::PllD),
            Err(ClockError::StopTimeout { gpclk: Gpclk::Gpclk1 })
        );
    }
}
