//! Carrier Lifecycle
//!
//! Planning is pure: [`CarrierPlan::new`] resolves the pin's clock route,
//! the source rate and the divisor without touching hardware. [`Carrier`]
//! then applies the plan and owns the registers until it is shut down.
//!
//! Start order: pin to its clock function, then program the generator.
//! Shutdown order: pin back to output, then stop the generator.

use core::fmt;

use crate::clock::{self, ClockSettings, ClockSource, Divisor, GeneratorStatus, Gpclk, Mash};
use crate::config::{self, RESTORE_FUNCTION};
use crate::gpio::{self, ClockRoute, Function};
use crate::mmio::Registers;
use crate::types::{Frequency, Pin};
use crate::{Error, Result};

const DEFAULT_PIN: Pin = match config::default_pin() {
    Some(pin) => pin,
    None => panic!("default pin out of range"),
};

const DEFAULT_FREQUENCY: Frequency = match config::default_frequency() {
    Some(frequency) => frequency,
    None => panic!("default frequency is zero"),
};

/// What the user asked for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CarrierConfig {
    /// Output pin
    pub pin: Pin,
    /// Carrier frequency
    pub frequency: Frequency,
    /// Generator clock source
    pub source: ClockSource,
    /// Source rate, when it differs from the nominal one
    pub source_frequency: Option<Frequency>,
    /// Noise-shaping filter
    pub mash: Mash,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            pin: DEFAULT_PIN,
            frequency: DEFAULT_FREQUENCY,
            source: config::DEFAULT_SOURCE,
            source_frequency: None,
            mash: config::DEFAULT_MASH,
        }
    }
}

/// Resolved register settings for a carrier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CarrierPlan {
    route: ClockRoute,
    target: Frequency,
    source_frequency: Frequency,
    settings: ClockSettings,
}

impl CarrierPlan {
    /// Resolve `config` into register settings
    pub fn new(config: &CarrierConfig) -> Result<Self> {
        let route = gpio::clock_route(config.pin)?;
        let source_frequency = config
            .source_frequency
            .or_else(|| config.source.nominal_frequency())
            .ok_or(Error::UnknownSourceFrequency(config.source))?;
        let divisor = Divisor::for_frequency(source_frequency, config.frequency, config.mash)?;

        Ok(Self {
            route,
            target: config.frequency,
            source_frequency,
            settings: ClockSettings {
                source: config.source,
                mash: config.mash,
                divisor,
            },
        })
    }

    /// Output pin
    #[must_use]
    pub const fn pin(&self) -> Pin {
        self.route.pin
    }

    /// Alternate function routing the clock to the pin
    #[must_use]
    pub const fn function(&self) -> Function {
        self.route.function
    }

    /// Generator driven
    #[must_use]
    pub const fn gpclk(&self) -> Gpclk {
        self.route.gpclk
    }

    /// Requested frequency
    #[must_use]
    pub const fn target(&self) -> Frequency {
        self.target
    }

    /// Source rate the divisor was computed from
    #[must_use]
    pub const fn source_frequency(&self) -> Frequency {
        self.source_frequency
    }

    /// Generator settings
    #[must_use]
    pub const fn settings(&self) -> &ClockSettings {
        &self.settings
    }

    /// Average frequency the divisor actually produces
    #[must_use]
    pub fn achieved(&self) -> Frequency {
        self.settings
            .divisor
            .output_frequency(self.source_frequency)
            .unwrap_or(self.target)
    }

    /// `achieved - target` in Hz
    #[must_use]
    pub fn error_hz(&self) -> i64 {
        self.achieved().offset_from(self.target)
    }

    /// Instantaneous output range caused by the MASH filter
    #[must_use]
    pub fn span(&self) -> (u32, u32) {
        self.settings
            .divisor
            .frequency_span(self.source_frequency, self.settings.mash)
    }
}

impl fmt::Display for CarrierPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} -> {}) = {} {} / {} ({})",
            self.route.pin,
            self.route.function,
            self.route.gpclk,
            self.settings.source,
            self.source_frequency,
            self.settings.divisor,
            self.settings.mash,
        )
    }
}

/// A running carrier
///
/// Dropping a running carrier restores the pin and stops the generator.
pub struct Carrier<R: Registers> {
    regs: R,
    plan: CarrierPlan,
    running: bool,
}

impl<R: Registers> Carrier<R> {
    /// Switch the pin to its clock function and start the generator
    ///
    /// If the generator fails to start the pin is restored before returning.
    pub fn start(regs: R, plan: CarrierPlan) -> Result<Self> {
        let mut carrier = Self {
            regs,
            plan,
            running: false,
        };

        gpio::set_function(&mut carrier.regs, plan.pin(), plan.function());
        carrier.running = true;
        clock::start(&mut carrier.regs, plan.gpclk(), plan.settings())?;

        log::debug!("carrier up: {}", plan);
        Ok(carrier)
    }

    /// Return the pin to a safe state and stop the generator
    ///
    /// Does nothing once the carrier is already stopped.
    pub fn shutdown(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        self.running = false;

        gpio::set_function(&mut self.regs, self.plan.pin(), RESTORE_FUNCTION);
        clock::stop(&mut self.regs, self.plan.gpclk(), self.plan.settings().source)?;

        log::debug!("carrier down: {} is {}", self.plan.pin(), RESTORE_FUNCTION);
        Ok(())
    }

    /// Whether the carrier is transmitting
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// The plan being transmitted
    #[must_use]
    pub const fn plan(&self) -> &CarrierPlan {
        &self.plan
    }

    /// Read back the generator registers
    pub fn status(&mut self) -> GeneratorStatus {
        clock::status(&mut self.regs, self.plan.gpclk())
    }

    /// Underlying registers
    #[must_use]
    pub const fn registers(&self) -> &R {
        &self.regs
    }
}

impl<R: Registers> Drop for Carrier<R> {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            log::error!("failed to restore {}: {}", self.plan.pin(), err);
        }
    }
}

impl<R: Registers> fmt::Debug for Carrier<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carrier")
            .field("plan", &self.plan)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}
