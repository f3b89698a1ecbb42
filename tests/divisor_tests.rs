//! Tests for clock divisor calculation
//!
//! Verifies the 12.12 fixed-point divisor, its range limits per MASH
//! order, and the resulting output frequencies.

use gpclk_carrier::clock::{ClockSource, Divisor, DivisorError, Mash};
use gpclk_carrier::types::Frequency;

fn hz(value: u32) -> Frequency {
    Frequency::from_hz(value).unwrap()
}

const PLLD: u32 = 500_000_000;
const OSC: u32 = 19_200_000;

// =============================================================================
// Divisor Value Tests
// =============================================================================

#[test]
fn fm_broadcast_divisor() {
    // 500 MHz / 104.5 MHz * 4096 = 19598.08 -> 19598
    let div = Divisor::for_frequency(hz(PLLD), hz(104_500_000), Mash::OneStage).unwrap();
    assert_eq!(div.to_register(), 19_598);
    assert_eq!(div.integer(), 4);
    assert_eq!(div.fraction(), 3_214);
}

#[test]
fn exact_integer_divisor() {
    // 500 MHz / 1 MHz = 500 exactly
    let div = Divisor::for_frequency(hz(PLLD), hz(1_000_000), Mash::OneStage).unwrap();
    assert_eq!(div.integer(), 500);
    assert_eq!(div.fraction(), 0);
    assert_eq!(div.to_register(), 500 << 12);
}

#[test]
fn fractional_divisor_40m_band() {
    // 500 MHz / 7 MHz = 71.428...
    let div = Divisor::for_frequency(hz(PLLD), hz(7_000_000), Mash::OneStage).unwrap();
    assert_eq!(div.integer(), 71);
    assert_eq!(div.fraction(), 1_755);
}

#[test]
fn oscillator_source() {
    // 19.2 MHz / 1 MHz = 19.2
    let div = Divisor::for_frequency(hz(OSC), hz(1_000_000), Mash::OneStage).unwrap();
    assert_eq!(div.integer(), 19);
    assert_eq!(div.fraction(), 819);
}

#[test]
fn integer_mash_truncates_fraction() {
    let div = Divisor::for_frequency(hz(PLLD), hz(7_000_000), Mash::Integer).unwrap();
    assert_eq!(div.integer(), 71);
    assert_eq!(div.fraction(), 0);
}

#[test]
fn fixed_point_value() {
    let div = Divisor::for_frequency(hz(PLLD), hz(200_000_000), Mash::OneStage).unwrap();
    // 2.5 is exactly representable in 12.12
    assert_eq!(div.value().to_num::<f64>(), 2.5);
    assert_eq!(div.to_string(), "2.5");
}

#[test]
fn register_roundtrip() {
    let div = Divisor::for_frequency(hz(PLLD), hz(104_500_000), Mash::OneStage).unwrap();
    assert_eq!(Divisor::from_register(div.to_register()), div);
}

#[test]
fn register_decode_ignores_upper_byte() {
    let div = Divisor::from_register(0x5A00_4C8E);
    assert_eq!(div.integer(), 4);
    assert_eq!(div.fraction(), 0xC8E);
}

// =============================================================================
// Range Limit Tests
// =============================================================================

#[test]
fn too_low_for_twelve_bit_integer() {
    // 500 MHz / 4096 = 122070.3 Hz; anything at or below needs DIVI >= 4096
    let err = Divisor::for_frequency(hz(PLLD), hz(122_070), Mash::OneStage).unwrap_err();
    assert_eq!(
        err,
        DivisorError::TooLow {
            target: hz(122_070),
            minimum_hz: 122_071,
        }
    );
}

#[test]
fn lowest_reachable_frequency() {
    let div = Divisor::for_frequency(hz(PLLD), hz(122_071), Mash::OneStage).unwrap();
    assert_eq!(div.integer(), 4_095);
}

#[test]
fn too_high_for_mash_order() {
    // 1-stage MASH needs DIVI >= 2, so 250 MHz is the ceiling from PLLD
    assert!(Divisor::for_frequency(hz(PLLD), hz(250_000_000), Mash::OneStage).is_ok());
    let err = Divisor::for_frequency(hz(PLLD), hz(250_000_001), Mash::OneStage).unwrap_err();
    assert_eq!(
        err,
        DivisorError::TooHigh {
            target: hz(250_000_001),
            maximum_hz: 250_000_000,
            mash: Mash::OneStage,
        }
    );
}

#[test]
fn minimum_divi_per_mash_order() {
    // 100 MHz from PLLD is DIVI 5: fine for every order
    for mash in [Mash::Integer, Mash::OneStage, Mash::TwoStage, Mash::ThreeStage] {
        assert!(Divisor::for_frequency(hz(PLLD), hz(100_000_000), mash).is_ok());
    }
    // 104.5 MHz is DIVI 4: too small for 3-stage MASH
    assert!(matches!(
        Divisor::for_frequency(hz(PLLD), hz(104_500_000), Mash::ThreeStage),
        Err(DivisorError::TooHigh { maximum_hz: 100_000_000, .. })
    ));
}

#[test]
fn integer_mode_reaches_source_frequency() {
    let div = Divisor::for_frequency(hz(PLLD), hz(PLLD), Mash::Integer).unwrap();
    assert_eq!(div.integer(), 1);
}

#[test]
fn error_messages() {
    let err = Divisor::for_frequency(hz(PLLD), hz(1_000), Mash::OneStage).unwrap_err();
    assert_eq!(
        err.to_string(),
        "1000 Hz is below the lowest reachable frequency of 122071 Hz"
    );
}

// =============================================================================
// Output Frequency Tests
// =============================================================================

#[test]
fn average_output_frequency() {
    let div = Divisor::for_frequency(hz(PLLD), hz(104_500_000), Mash::OneStage).unwrap();
    // 500 MHz * 4096 / 19598 = 104500459.2
    assert_eq!(div.output_frequency(hz(PLLD)), Some(hz(104_500_459)));
}

#[test]
fn output_error_bounded_by_fraction_step() {
    for target in [1_000_000, 7_074_000, 14_074_000, 27_125_000, 104_500_000] {
        let div = Divisor::for_frequency(hz(PLLD), hz(target), Mash::OneStage).unwrap();
        let out = div.output_frequency(hz(PLLD)).unwrap().as_hz();
        // Truncating the divisor can only raise the output frequency
        assert!(out >= target, "{out} < {target}");
        // One DIVF step at DIVI=4 moves ~6 kHz at 104.5 MHz
        assert!(out - target < 6_500, "{out} too far from {target}");
    }
}

#[test]
fn frequency_span_integer() {
    let div = Divisor::for_frequency(hz(PLLD), hz(1_000_000), Mash::Integer).unwrap();
    assert_eq!(div.frequency_span(hz(PLLD), Mash::Integer), (1_000_000, 1_000_000));
}

#[test]
fn frequency_span_one_stage() {
    // DIVI = 4: edges fall between 500/5 and 500/4 MHz
    let div = Divisor::for_frequency(hz(PLLD), hz(104_500_000), Mash::OneStage).unwrap();
    assert_eq!(
        div.frequency_span(hz(PLLD), Mash::OneStage),
        (100_000_000, 125_000_000)
    );
}

#[test]
fn frequency_span_three_stage() {
    // DIVI = 71: 500/75 .. 500/68 MHz
    let div = Divisor::for_frequency(hz(PLLD), hz(7_000_000), Mash::ThreeStage).unwrap();
    assert_eq!(
        div.frequency_span(hz(PLLD), Mash::ThreeStage),
        (6_666_666, 7_352_941)
    );
}

// =============================================================================
// Nominal Source Tests
// =============================================================================

#[test]
fn nominal_source_frequencies() {
    assert_eq!(ClockSource::PllD.nominal_frequency(), Some(hz(PLLD)));
    assert_eq!(ClockSource::Oscillator.nominal_frequency(), Some(hz(OSC)));
    assert_eq!(ClockSource::Hdmi.nominal_frequency(), Some(hz(216_000_000)));
    assert_eq!(ClockSource::PllA.nominal_frequency(), None);
    assert_eq!(ClockSource::Ground.nominal_frequency(), None);
}
