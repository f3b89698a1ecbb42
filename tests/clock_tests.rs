//! Tests for the Clock Manager programming sequence
//!
//! Runs the generator protocol against simulated registers and checks the
//! exact writes, including the `0x5A` password on every one of them.

use gpclk_carrier::clock::{self, ClockError, ClockSettings, ClockSource, Divisor, Gpclk, Mash};
use gpclk_carrier::mmio::{BusAddress, RegisterWrite, SimulatedRegisters};
use gpclk_carrier::regs::{cm, CM_GPCTL, CM_GPDIV};
use gpclk_carrier::types::Frequency;

fn fm_settings() -> ClockSettings {
    let source = Frequency::from_hz(500_000_000).unwrap();
    let target = Frequency::from_hz(104_500_000).unwrap();
    ClockSettings {
        source: ClockSource::PllD,
        mash: Mash::OneStage,
        divisor: Divisor::for_frequency(source, target, Mash::OneStage).unwrap(),
    }
}

fn write(address: BusAddress, value: u32) -> RegisterWrite {
    RegisterWrite { address, value }
}

// =============================================================================
// Register Layout Tests
// =============================================================================

#[test]
fn generator_registers() {
    assert_eq!(Gpclk::Gpclk0.control().get(), 0x7E10_1070);
    assert_eq!(Gpclk::Gpclk0.divisor().get(), 0x7E10_1074);
    assert_eq!(Gpclk::Gpclk2.control(), CM_GPCTL[2]);
    assert_eq!(Gpclk::Gpclk2.divisor(), CM_GPDIV[2]);
}

#[test]
fn control_field_values() {
    assert_eq!(cm::PASSWD, 0x5A00_0000);
    assert_eq!(cm::ENAB, 0x10);
    assert_eq!(cm::BUSY, 0x80);
    assert_eq!(ClockSource::PllD.bits(), 6);
    assert_eq!(Mash::OneStage.bits(), 0x200);
}

// =============================================================================
// Start Sequence Tests
// =============================================================================

#[test]
fn start_idle_generator() {
    let mut regs = SimulatedRegisters::new();
    clock::start(&mut regs, Gpclk::Gpclk0, &fm_settings()).unwrap();

    assert_eq!(
        regs.writes(),
        [
            write(CM_GPDIV[0], 0x5A00_4C8E),
            write(CM_GPCTL[0], 0x5A00_0206),
            write(CM_GPCTL[0], 0x5A00_0216),
        ]
    );
}

#[test]
fn every_write_carries_password() {
    let mut regs = SimulatedRegisters::with_busy_latency(5);
    regs.preset(CM_GPCTL[1], cm::ENAB | cm::BUSY | ClockSource::Oscillator.bits());
    clock::start(&mut regs, Gpclk::Gpclk1, &fm_settings()).unwrap();

    assert!(!regs.writes().is_empty());
    for w in regs.writes() {
        assert_eq!(w.value & cm::PASSWD_MASK, cm::PASSWD, "{w:?}");
    }
}

#[test]
fn start_stops_running_generator_first() {
    let mut regs = SimulatedRegisters::with_busy_latency(3);
    regs.preset(CM_GPCTL[0], cm::ENAB | cm::BUSY | ClockSource::Oscillator.bits());
    clock::start(&mut regs, Gpclk::Gpclk0, &fm_settings()).unwrap();

    let writes = regs.writes();
    let div_index = writes
        .iter()
        .position(|w| w.address == CM_GPDIV[0])
        .unwrap();
    // Generator disabled (ENAB clear) before the divisor changed
    assert!(div_index > 0);
    for w in &writes[..div_index] {
        assert_eq!(w.address, CM_GPCTL[0]);
        assert_eq!(w.value & cm::ENAB, 0);
        assert_eq!(w.value & cm::SRC_MASK, ClockSource::PllD.bits());
    }
}

#[test]
fn enable_written_after_source() {
    let mut regs = SimulatedRegisters::with_busy_latency(2);
    clock::start(&mut regs, Gpclk::Gpclk2, &fm_settings()).unwrap();

    let controls: Vec<u32> = regs
        .writes()
        .iter()
        .filter(|w| w.address == CM_GPCTL[2])
        .map(|w| w.value)
        .collect();
    assert_eq!(controls[0], 0x5A00_0206);
    assert!(controls[1..].iter().all(|&v| v == 0x5A00_0216));
}

#[test]
fn slow_generator_fits_write_log() {
    // Each enable retry reads twice, so ~50 writes for 100 reads of latency
    let mut regs = SimulatedRegisters::with_busy_latency(100);
    clock::start(&mut regs, Gpclk::Gpclk0, &fm_settings()).unwrap();
    assert!(!regs.overflowed());
    assert!(clock::status(&mut regs, Gpclk::Gpclk0).busy);
}

#[test]
fn status_after_start() {
    let mut regs = SimulatedRegisters::new();
    let settings = fm_settings();
    clock::start(&mut regs, Gpclk::Gpclk0, &settings).unwrap();

    let status = clock::status(&mut regs, Gpclk::Gpclk0);
    assert!(status.enabled);
    assert!(status.busy);
    assert_eq!(status.source, ClockSource::PllD);
    assert_eq!(status.mash, Mash::OneStage);
    assert_eq!(status.divisor, settings.divisor);
    assert_eq!(regs.peek(CM_GPCTL[0]), 0x296);
}

#[test]
fn start_timeout() {
    let mut regs = SimulatedRegisters::with_stuck_busy();
    assert_eq!(
        clock::start(&mut regs, Gpclk::Gpclk0, &fm_settings()),
        Err(ClockError::StartTimeout { gpclk: Gpclk::Gpclk0 })
    );
}

// =============================================================================
// Stop Sequence Tests
// =============================================================================

#[test]
fn stop_running_generator() {
    let mut regs = SimulatedRegisters::new();
    clock::start(&mut regs, Gpclk::Gpclk0, &fm_settings()).unwrap();
    regs.clear_writes();

    clock::stop(&mut regs, Gpclk::Gpclk0, ClockSource::PllD).unwrap();
    assert_eq!(regs.writes(), [write(CM_GPCTL[0], 0x5A00_0006)]);
    assert_eq!(regs.peek(CM_GPCTL[0]) & (cm::ENAB | cm::BUSY), 0);
}

#[test]
fn stop_waits_for_busy() {
    let mut regs = SimulatedRegisters::with_busy_latency(4);
    regs.preset(CM_GPCTL[0], cm::ENAB | cm::BUSY | ClockSource::PllD.bits());
    clock::stop(&mut regs, Gpclk::Gpclk0, ClockSource::PllD).unwrap();

    let status = clock::status(&mut regs, Gpclk::Gpclk0);
    assert!(!status.enabled);
    assert!(!status.busy);
    assert!(!regs.writes().is_empty());
}

#[test]
fn stop_timeout() {
    let mut regs = SimulatedRegisters::with_stuck_busy();
    regs.preset(CM_GPCTL[2], cm::ENAB | cm::BUSY);
    let err = clock::stop(&mut regs, Gpclk::Gpclk2, ClockSource::PllD).unwrap_err();
    assert_eq!(err, ClockError::StopTimeout { gpclk: Gpclk::Gpclk2 });
    assert_eq!(err.to_string(), "GPCLK2 did not stop (BUSY stayed set)");
}

// =============================================================================
// Source and Filter Parsing Tests
// =============================================================================

#[test]
fn parse_clock_source() {
    assert_eq!("plld".parse::<ClockSource>(), Ok(ClockSource::PllD));
    assert_eq!("OSC".parse::<ClockSource>(), Ok(ClockSource::Oscillator));
    assert_eq!("oscillator".parse::<ClockSource>(), Ok(ClockSource::Oscillator));
    assert!("pllb".parse::<ClockSource>().is_err());
}

#[test]
fn source_display_parses_back() {
    for code in 0..8 {
        let source = ClockSource::from_bits(code);
        assert_eq!(source.to_string().parse::<ClockSource>(), Ok(source));
    }
}

#[test]
fn parse_mash() {
    assert_eq!("0".parse::<Mash>(), Ok(Mash::Integer));
    assert_eq!("integer".parse::<Mash>(), Ok(Mash::Integer));
    assert_eq!("3".parse::<Mash>(), Ok(Mash::ThreeStage));
    assert!("4".parse::<Mash>().is_err());
}

#[test]
fn mash_display() {
    assert_eq!(Mash::Integer.to_string(), "integer");
    assert_eq!(Mash::TwoStage.to_string(), "2-stage MASH");
}
