//! Raspberry Pi GPCLK Carrier Generator
//!
//! This library drives one of the BCM283x General Purpose Clock generators
//! (GPCLK0..2) out through a GPIO pin to produce an unmodulated RF carrier.
//! Any FM receiver tuned to the carrier frequency goes silent.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                         │
//! │  CLI (carrier-generator)  │  Signal wait  │  Logger          │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     CARRIER LAYER                            │
//! │  CarrierPlan (pure)  │  Carrier lifecycle (start/shutdown)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                  REGISTER PROTOCOL LAYER                     │
//! │  GPIO function select  │  Clock Manager  │  Divisor math     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   MEMORY-MAPPED I/O                          │
//! │  /dev/mem PeripheralMap  │  SimulatedRegisters               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Register programming follows the BCM2835 ARM Peripherals datasheet,
//! sections 6.1 (GPIO function select) and 6.3 (General Purpose GPIO Clocks).
//!
//! # Design Principles
//!
//! - **Pure planning**: frequency-to-divisor conversion and pin routing never touch hardware
//! - **One register seam**: everything writes through the [`mmio::Registers`] trait
//! - **No unsafe in protocol code**: unsafe is isolated in the `/dev/mem` layer
//! - **Explicit error handling**: all fallible operations return `Result`

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// BCM283x register map
pub mod regs;

/// Memory-mapped register access
///
/// The [`mmio::Registers`] seam plus the `/dev/mem` and simulated backends.
pub mod mmio;

/// Peripheral window discovery
pub mod soc;

/// GPIO function selection and clock routing
pub mod gpio;

/// General Purpose Clock generators
///
/// Divisor calculation and the Clock Manager programming protocol.
pub mod clock;

/// Carrier lifecycle
pub mod carrier;

/// Crate-level error type
pub mod error;

/// Stderr logger for the `log` facade
#[cfg(feature = "std")]
pub mod logger;

/// Termination signal handling
#[cfg(feature = "rpi")]
pub mod signal;

pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::carrier::{Carrier, CarrierConfig, CarrierPlan};
    pub use crate::clock::{ClockSource, Divisor, Gpclk, Mash};
    pub use crate::config::*;
    pub use crate::gpio::Function;
    pub use crate::mmio::{BusAddress, Registers, SimulatedRegisters};
    pub use crate::soc::PeripheralWindow;
    pub use crate::types::*;
    pub use crate::{Error, Result};

    // Logging
    pub use log::{debug, error, info, trace, warn};
}
