//! Stderr Logger
//!
//! Minimal `log::Log` backend for the command-line tool. Lines carry the
//! time since start-up, level and target:
//!
//! ```text
//! [      1523us]  INFO(carrier_generator): Transmitting carrier on 104500000 Hz
//! ```

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Logger writing to standard error
#[derive(Debug)]
pub struct StderrLogger {
    start: Instant,
    level: LevelFilter,
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

impl StderrLogger {
    /// Create a logger passing records at or above `level`
    #[must_use]
    pub fn new(level: LevelFilter) -> Self {
        Self {
            start: Instant::now(),
            level,
        }
    }

    /// Install the global logger
    ///
    /// Fails if a logger was already installed.
    pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = LOGGER.get_or_init(|| Self::new(level));
        log::set_logger(logger)?;
        log::set_max_level(logger.level);
        Ok(())
    }

    /// Format a record the way it is written to stderr
    #[must_use]
    pub fn format(&self, record: &Record<'_>) -> String {
        format!(
            "[{:10}us] {:>5}({}): {}",
            self.start.elapsed().as_micros(),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            let line = self.format(record);
            let _ = writeln!(std::io::stderr().lock(), "{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Map `-v`/`-q` counts onto a level, starting from `Info`
#[must_use]
pub fn level_from_verbosity(verbose: u8, quiet: u8) -> LevelFilter {
    match i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-3 => LevelFilter::Off,
        -2 => LevelFilter::Error,
        -1 => LevelFilter::Warn,
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_from_verbosity(0, 0), LevelFilter::Info);
        assert_eq!(level_from_verbosity(2, 0), LevelFilter::Trace);
        assert_eq!(level_from_verbosity(0, 1), LevelFilter::Warn);
        assert_eq!(level_from_verbosity(0, 9), LevelFilter::Off);
        assert_eq!(level_from_verbosity(1, 1), LevelFilter::Info);
    }

    #[test]
    fn filters_below_level() {
        let logger = StderrLogger::new(LevelFilter::Warn);
        let metadata = Metadata::builder().level(Level::Info).build();
        assert!(!logger.enabled(&metadata));
    }

    #[test]
    fn line_format() {
        let logger = StderrLogger::new(LevelFilter::Info);
        let line = logger.format(
            &Record::builder()
                .args(format_args!("hello"))
                .level(Level::Info)
                .target("carrier")
                .build(),
        );
        assert!(line.ends_with(" INFO(carrier): hello"), "{line}");
    }
}
