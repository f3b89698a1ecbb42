//! Carrier Generator
//!
//! Transmits an unmodulated carrier from a Raspberry Pi GPCLK pin until
//! interrupted. Turn a radio to the same frequency and it goes silent.
//!
//! ```text
//! sudo carrier-generator              # 104.5 MHz on GPIO4 (header pin 7)
//! sudo carrier-generator 106.2M
//! carrier-generator --dry-run 7074k   # show the register writes only
//! ```
//!
//! Stop with ctrl-c or ctrl-\.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::{error, info, warn};

use gpclk_carrier::carrier::{Carrier, CarrierConfig, CarrierPlan};
use gpclk_carrier::clock::{ClockSource, Gpclk, Mash};
use gpclk_carrier::config;
use gpclk_carrier::gpio::CLOCK_ROUTES;
use gpclk_carrier::logger::{self, StderrLogger};
use gpclk_carrier::mmio::{PeripheralMap, SimulatedRegisters};
use gpclk_carrier::regs;
use gpclk_carrier::signal::TerminationSignals;
use gpclk_carrier::soc::PeripheralWindow;
use gpclk_carrier::types::{Frequency, Pin};
use gpclk_carrier::{Error, Result};

/// Transmit an unmodulated RF carrier on a Raspberry Pi GPCLK pin
#[derive(Parser, Debug)]
#[command(name = "carrier-generator", version, about)]
struct Cli {
    /// Carrier frequency in Hz, or with a k/M/G suffix (e.g. 106.2M)
    #[arg(default_value = "104.5M")]
    frequency: Frequency,

    /// BCM GPIO pin carrying the clock (see --list-pins)
    #[arg(short, long, default_value = "4")]
    pin: Pin,

    /// Clock generator source: osc, plla, pllc, plld or hdmi
    #[arg(short, long, default_value = "plld")]
    source: ClockSource,

    /// Override the source frequency (e.g. 750M for PLLD on a Pi 4)
    #[arg(long)]
    source_freq: Option<Frequency>,

    /// MASH filter order, 0 (integer) to 3
    #[arg(short, long, default_value = "1")]
    mash: Mash,

    /// Physical peripheral base address instead of device-tree discovery
    #[arg(long, value_parser = parse_address)]
    peripheral_base: Option<u64>,

    /// Physical memory device
    #[arg(long, default_value = config::DEV_MEM_PATH)]
    mem_device: PathBuf,

    /// Print the register writes without touching hardware
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// List the pins that can output a clock and exit
    #[arg(long)]
    list_pins: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Less logging
    #[arg(short, long, action = ArgAction::Count)]
    quiet: u8,
}

fn parse_address(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|err| format!("invalid address {s:?}: {err}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if StderrLogger::init(logger::level_from_verbosity(cli.verbose, cli.quiet)).is_err() {
        eprintln!("logger already initialised");
    }

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    if cli.list_pins {
        list_pins();
        return Ok(ExitCode::SUCCESS);
    }

    let config = CarrierConfig {
        pin: cli.pin,
        frequency: cli.frequency,
        source: cli.source,
        source_frequency: cli.source_freq,
        mash: cli.mash,
    };
    let plan = CarrierPlan::new(&config)?;
    report(&plan);

    if cli.dry_run {
        return dry_run(plan);
    }

    // Block before touching hardware so an early ctrl-c still cleans up
    let signals = TerminationSignals::block().map_err(|source| Error::Io {
        context: "can't block termination signals",
        source,
    })?;

    let window = match cli.peripheral_base {
        Some(base) => PeripheralWindow::at(base),
        None => PeripheralWindow::discover(Path::new(config::DT_RANGES_PATH)),
    };
    info!("Peripherals at {:#x} ({:#x} bytes)", window.base, window.size);
    let map = PeripheralMap::open(&cli.mem_device, window)?;

    let mut carrier = Carrier::start(map, plan)?;
    info!("Transmitting carrier on {} Hz", plan.target().as_hz());

    let signal = signals.wait().map_err(|source| Error::Io {
        context: "waiting for termination signal",
        source,
    })?;
    info!("Received {signal}. Cleaning resources...");
    carrier.shutdown()?;

    Ok(ExitCode::from(signal.exit_code()))
}

fn report(plan: &CarrierPlan) {
    info!("{plan}");
    info!(
        "Average output {} ({:+} Hz), instantaneous {}..{} Hz",
        plan.achieved(),
        plan.error_hz(),
        plan.span().0,
        plan.span().1
    );
    if plan.span().1 > config::GPIO_CLOCK_MAX_HZ {
        warn!(
            "Output exceeds the {} Hz GPIO clock limit, expect a weak carrier",
            config::GPIO_CLOCK_MAX_HZ
        );
    }
}

fn dry_run(plan: CarrierPlan) -> Result<ExitCode> {
    let mut carrier = Carrier::start(SimulatedRegisters::new(), plan)?;
    info!("Transmitting carrier on {} Hz (simulated)", plan.target().as_hz());
    carrier.shutdown()?;

    if carrier.registers().overflowed() {
        warn!("Register log is incomplete");
    }
    for write in carrier.registers().writes() {
        info!(
            "{:<10} {} <- {:#010x}",
            regs::name(write.address).unwrap_or("?"),
            write.address,
            write.value
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn list_pins() {
    for gpclk in Gpclk::ALL {
        for route in CLOCK_ROUTES.iter().filter(|route| route.gpclk == gpclk) {
            println!("{gpclk}: {} ({})", route.pin, route.function);
        }
    }
}
